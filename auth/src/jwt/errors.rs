use thiserror::Error;

/// Error type for token codec operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Token signature is invalid")]
    InvalidSignature,
}

/// Error raised while loading the signing key pair.
///
/// Startup-fatal: a process that cannot load its keys must not serve
/// authenticated traffic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyLoadError {
    #[error("Missing {0} key material")]
    MissingMaterial(&'static str),

    #[error("Failed to read key file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Invalid RSA private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid RSA public key: {0}")]
    InvalidPublicKey(String),

    #[error("Public key does not match private key")]
    MismatchedPair,
}
