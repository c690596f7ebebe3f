#[cfg(feature = "relaxer")]
mod layout_model;
#[cfg(feature = "relaxer")]
mod barnes_hut_layout;
#[cfg(feature = "relaxer")]
mod relaxer;

#[cfg(feature = "relaxer")]
pub use layout_model::*;
#[cfg(feature = "relaxer")]
pub use barnes_hut_layout::*;
#[cfg(feature = "relaxer")]
pub use relaxer::*;

#[cfg(test)]
#[cfg(feature = "relaxer")]
mod relaxer_tests;
