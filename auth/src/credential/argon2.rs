use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::CredentialError;

/// Turns raw credentials into storable Argon2id hashes.
///
/// Only checks presence; strength rules belong to the caller.
#[derive(Clone, Default)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a raw credential with a fresh random salt.
    ///
    /// # Returns
    /// PHC string (algorithm, parameters, salt and hash)
    ///
    /// # Errors
    /// * `Empty` - Credential is empty
    /// * `HashingFailed` - Argon2 rejected the input
    pub fn hash(&self, credential: &str) -> Result<String, CredentialError> {
        if credential.is_empty() {
            return Err(CredentialError::Empty);
        }

        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(credential.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::HashingFailed(e.to_string()))
    }

    /// Check a raw credential against a stored PHC string.
    ///
    /// # Errors
    /// * `InvalidHash` - The stored value is not a PHC string
    pub fn verify(&self, credential: &str, stored: &str) -> Result<bool, CredentialError> {
        let parsed =
            PasswordHash::new(stored).map_err(|e| CredentialError::InvalidHash(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(credential.as_bytes(), &parsed)
            .is_ok())
    }
}
