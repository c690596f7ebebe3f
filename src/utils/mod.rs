mod constants;
mod constants_config;
pub mod errors;

pub use constants::*;
pub use constants_config::*;
pub use errors::ForceTreeError;

#[cfg(test)]
mod utils_tests;
