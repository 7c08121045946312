use thiserror::Error;

use crate::storage::StoreError;

/// Failures surfaced by portal services
#[derive(Debug, Error)]
pub enum PortalError {
    /// No caller identity could be resolved
    #[error("Not signed in")]
    Unauthenticated,

    /// The caller is signed in but lacks the required privilege
    #[error("Administrator privileges required")]
    Forbidden,

    #[error("Weekly payment limit reached ({cap})")]
    LimitExceeded { cap: u32 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PortalError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;
