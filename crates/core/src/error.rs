//! Domain-level error type shared across crates.

use crate::types::JobId;

/// Errors produced by domain logic and surfaced through the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup failed.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity type name (e.g. "Job").
        entity: &'static str,
        /// The id that was looked up.
        id: JobId,
    },

    /// Input failed validation; maps to a client error at the boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested operation conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
