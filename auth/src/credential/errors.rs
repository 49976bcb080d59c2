use thiserror::Error;

/// Error type for credential hashing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credential must not be empty")]
    Empty,

    #[error("Credential hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored credential hash is invalid: {0}")]
    InvalidHash(String),
}
