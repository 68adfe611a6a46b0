use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("cannot read sample file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scene bounds must be strictly positive (NaN included).
    #[error("{name} bound must be a positive number, got {value}")]
    InvalidBounds { name: &'static str, value: f64 },

    #[error("malformed sample file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
