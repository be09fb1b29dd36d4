//! Common error types for music-lib

use thiserror::Error;

/// Common result type for music-lib operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that cross the catalog boundary
///
/// Validation variants (`NoFieldsSpecified`, `InvalidDate`, `InvalidInput`)
/// are raised before any storage call. Everything else is a storage or
/// startup fault and is surfaced unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Update request carried no field to assign
    #[error("No fields specified for update")]
    NoFieldsSpecified,

    /// Release date not in DD.MM.YYYY form
    #[error("Invalid release date '{0}': expected DD.MM.YYYY")]
    InvalidDate(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than a fault
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NoFieldsSpecified | Error::InvalidDate(_) | Error::InvalidInput(_)
        )
    }
}
