pub mod app;
pub mod assessment;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod explain;
pub mod guidance;
pub mod test_utils;
pub mod utils;

pub use error::{AssessError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
