//! # AppError
//!
//! Centralized error handling for the lost-and-found core.
//! Maps lifecycle failures to actionable error types.

use thiserror::Error;

use crate::models::ItemId;

/// The primary error type for all claim lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Resource not found (e.g., Item, Claim)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Malformed or missing input (e.g., roll number not 5 digits, bad email)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The same claimant already holds a claim on this item
    #[error("duplicate claim: {0}")]
    DuplicateClaim(String),

    /// Operation illegal for the item's current status
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Concurrent modification could not be reconciled
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn item_not_found(id: ItemId) -> Self {
        AppError::NotFound("Item".to_string(), id.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        AppError::InvalidState(msg.into())
    }
}

/// A specialized Result type for lifecycle logic.
pub type Result<T> = std::result::Result<T, AppError>;

/// Failures reported by an `ItemRepository` implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The stored document moved on since it was read.
    #[error("item {id} was modified concurrently (expected version {expected})")]
    VersionConflict { id: ItemId, expected: u64 },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { .. } => AppError::Conflict(err.to_string()),
            StoreError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

/// Failures reported by a `Notifier` implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("template rendering failed: {0}")]
    Render(String),

    #[error("mail transport failed: {0}")]
    Transport(String),
}
