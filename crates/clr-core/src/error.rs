//! # Validation Errors
//!
//! Structured validation errors for request-boundary checks. The issuer
//! and vault assume pre-validated input; these errors are produced at
//! the HTTP layer before domain code runs.

use thiserror::Error;

/// A request field failed validation before reaching the issuer or vault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An unrecognized license tier string.
    #[error("unknown license tier: {0}. Valid: STANDARD, PREMIUM, SOVEREIGN")]
    InvalidTier(String),
}
