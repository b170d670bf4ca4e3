//! Error types
//!
//! Configuration errors are fatal at startup; spawn errors are reported to
//! the caller and the board carries on.

use thiserror::Error;

/// Board configuration could not be loaded or violates an invariant
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A ball spawn request was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    #[error("board is full ({max} active balls)")]
    Capacity { max: usize },
    #[error("spawn x {x} is outside the board [0, {width}]")]
    OutOfBounds { x: f64, width: f64 },
}
