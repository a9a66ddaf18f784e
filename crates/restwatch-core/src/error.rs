//! Shared error type across restwatch crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, RestwatchError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum RestwatchError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("duplicate metrics collector registration attempted: {0}")]
    AlreadyRegistered(String),
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("inconsistent label cardinality: expected {expected} label values, got {got}")]
    LabelMismatch { expected: usize, got: usize },
    #[error("internal: {0}")]
    Internal(String),
}

impl RestwatchError {
    /// True for errors that must stop the process before it starts serving.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            RestwatchError::Config(_)
                | RestwatchError::UnsupportedVersion
                | RestwatchError::AlreadyRegistered(_)
                | RestwatchError::InvalidMetric(_)
        )
    }
}
