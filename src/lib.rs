//! Spatial indexing and Barnes-Hut force approximation for interactive graph layouts.
//!
//! - [`quadtree`]: the point-region quadtree, its weighted cell aggregates and the
//!   Barnes-Hut traversal built on them.
//! - [`rtree`]: an STR-packed R-tree answering the same nearest-element queries.
//! - [`spatial`]: the [`SpatialIndex`](spatial::SpatialIndex) contract, the brute-force
//!   reference scan and publish-by-swap snapshots shared between threads.
//! - [`layout`]: a force-directed layout step and the stoppable relaxer that drives it.
pub mod utils;
pub mod models;
pub mod spatial;
pub mod quadtree;
pub mod rtree;
pub mod layout;
