use auth::CredentialError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Display name is empty")]
    Empty,

    #[error("Display name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Store-level failures around a unit of work.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Failed to begin transaction: {0}")]
    Begin(String),

    #[error("Failed to commit transaction: {0}")]
    Commit(String),

    #[error("Transaction deadline exceeded")]
    TimedOut,

    #[error("Transaction already finished")]
    Closed,

    #[error("Operation requires an open transaction")]
    NotInTransaction,
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid display name: {0}")]
    InvalidDisplayName(#[from] DisplayNameError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    // Domain-level errors
    #[error("Account already exists for email: {0}")]
    DuplicateAccount(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("No authenticated identity in request context")]
    MissingIdentity,

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    // Infrastructure errors
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
