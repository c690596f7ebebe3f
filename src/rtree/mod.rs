#[cfg(feature = "rtree")]
mod rtree;

#[cfg(feature = "rtree")]
pub use rtree::*;
