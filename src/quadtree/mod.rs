mod quadtree;
mod barnes_hut;

pub use quadtree::*;
pub use barnes_hut::*;
