mod spatial_index;
mod radius_scan;
mod snapshot;

pub use spatial_index::*;
pub use radius_scan::*;
pub use snapshot::*;

#[cfg(test)]
mod spatial_tests;
#[cfg(test)]
mod snapshot_tests;
