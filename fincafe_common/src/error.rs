//! Common error types for the FinCafe crates

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FincafeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
