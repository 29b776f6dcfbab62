//! Crate-wide error taxonomy.
//!
//! Domain rejections (duplicate rows, exhausted codes, bad action tokens) are
//! distinguished from infrastructure failures so callers can decide between
//! rendering a warning and propagating.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Already consumed: {0}")]
    AlreadyConsumed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid action token: {0}")]
    InvalidAction(String),

    #[error("Invalid transition from {from} on {action}")]
    InvalidTransition { from: String, action: String },
}

impl CoreError {
    /// Whether this error is a domain-level rejection that should be rendered
    /// back to the user rather than treated as an outage.
    pub fn is_domain_rejection(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::AlreadyExists(_)
                | Self::CapacityExceeded(_)
                | Self::AlreadyConsumed(_)
                | Self::InvalidAction(_)
                | Self::InvalidTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
