//! fincafe_common
//!
//! Shared functionality for the FinCafe crates: logging setup, environment-driven
//! settings and the common error type.

pub mod config;
pub mod error;
mod logging;

pub use config::{MigrationMode, Settings};
pub use error::*;
pub use logging::*;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'), "Version should be in semver format");
    }
}
