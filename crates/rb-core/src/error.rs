//! # AppError
//!
//! Centralized error handling for the Rusty-Blog ecosystem.
//! Maps domain-specific failures to actionable error types; the web layer
//! turns each variant into a status code, storage errors never leak through.

use thiserror::Error;

/// The primary error type for all rb-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Resource not found (e.g., Post, Ad, User)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., blank title, body too long)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// No authenticated session (missing, expired or stale)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Username/password pair rejected. Deliberately carries no detail.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Authenticated, but acting on something the user does not own
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Infrastructure failure (e.g., DB down, hashing failure)
    #[error("internal service error: {0}")]
    Internal(String),

    /// Resource already exists (e.g., duplicate ad title or username)
    #[error("conflict: {0}")]
    Conflict(String),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound(entity.to_string(), id.to_string())
    }
}

/// A specialized Result type for Rusty-Blog logic.
pub type Result<T> = std::result::Result<T, AppError>;
