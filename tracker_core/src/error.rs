//! Configuration errors. The tracking computation itself cannot fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A distance or threshold that must be strictly positive is not
    /// (NaN included).
    #[error("{name} must be a positive number, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reject zero, negative and NaN values. Infinity is accepted.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}
