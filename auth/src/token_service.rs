use uuid::Uuid;

use crate::jwt::codec;
use crate::jwt::Header;
use crate::jwt::JwtError;
use crate::jwt::KeyProvider;
use crate::jwt::Payload;

/// Issues and validates access tokens for authenticated identities.
///
/// Built on the token codec and a loaded [`KeyProvider`]. Holds no mutable
/// state, so one instance can serve every concurrent request.
pub struct TokenService {
    keys: KeyProvider,
}

/// Result of a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Wire-form access token
    pub token: String,
    /// Unique identifier embedded in the token
    pub jti: String,
}

/// Token validation errors.
///
/// Wraps the codec failure for logging; callers facing the outside world
/// should collapse every variant into one unauthorized outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Token rejected: {0}")]
    Rejected(#[from] JwtError),
}

impl TokenService {
    /// Create a token service around an already loaded key pair.
    pub fn new(keys: KeyProvider) -> Self {
        Self { keys }
    }

    /// Issue a token for a user.
    ///
    /// Generates a fresh `jti` and signs the payload
    /// `{jti, userId, email}`.
    ///
    /// # Arguments
    /// * `user_id` - User identifier placed under `userId`
    /// * `email` - Email placed under `email`
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed; no token is produced
    pub fn issue(&self, user_id: &str, email: &str) -> Result<IssuedToken, JwtError> {
        let jti = Uuid::new_v4().to_string();
        let payload = Payload::for_user(jti.as_str(), user_id, email);

        let token = codec::encode(&Header::default(), &payload, &self.keys).map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to issue access token");
            e
        })?;

        Ok(IssuedToken { token, jti })
    }

    /// Verify a token and return its payload.
    ///
    /// The only place that decides whether a token is acceptable.
    ///
    /// # Errors
    /// * `Rejected` - Malformed token or invalid signature; no payload is returned
    pub fn validate_and_decode(&self, token: &str) -> Result<Payload, AuthenticationError> {
        codec::verify(token, &self.keys)?;
        let decoded = codec::decode(token)?;

        Ok(decoded.payload)
    }
}
