use thiserror::Error;

use crate::storage::TagConflict;

/// Error taxonomy for the data-access layer. Validation and
/// authorization failures are raised before any store call; duplicate
/// tags carry enough detail for "go to that cow" recovery; everything
/// else from the store is generic and never retried.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("tag number '{number}' is already in use by another cow")]
    DuplicateTag { number: String, cow_id: String },

    #[error("cannot remove the last manager; promote someone else first")]
    LastManager,

    #[error("{0}")]
    Authorization(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl DomainError {
    /// Translate a store failure. This is the only place a store-level
    /// error is inspected and reinterpreted: a tag-uniqueness violation
    /// becomes a structured duplicate-tag error, anything else stays a
    /// generic store failure.
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast_ref::<TagConflict>() {
            Some(conflict) => DomainError::DuplicateTag {
                number: conflict.number.clone(),
                cow_id: conflict.cow_id.clone(),
            },
            None => DomainError::Store(err),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
