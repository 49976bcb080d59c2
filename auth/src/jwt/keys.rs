use std::fs;
use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::crypto;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::JwtError;
use super::errors::KeyLoadError;

const PROBE_MESSAGE: &[u8] = b"key-provider-probe";

/// RSA key pair used to sign and verify tokens.
///
/// Loaded once at startup and read-only afterwards, so a single instance
/// can be shared (behind an `Arc`) by any number of concurrent callers.
/// Signing uses RSASSA-PKCS1-v1_5 with SHA-256 (RS256): callers hand in the
/// message bytes and the digest is computed as part of the primitive.
pub struct KeyProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl KeyProvider {
    const ALGORITHM: Algorithm = Algorithm::RS256;

    /// Load the key pair from PEM blobs.
    ///
    /// # Arguments
    /// * `private_pem` - PKCS#8 `PRIVATE KEY` block holding an RSA key
    /// * `public_pem` - X.509 SubjectPublicKeyInfo `PUBLIC KEY` block holding an RSA key
    ///
    /// # Errors
    /// * `MissingMaterial` - Either blob is empty
    /// * `InvalidPrivateKey` / `InvalidPublicKey` - Not parseable or not RSA
    /// * `MismatchedPair` - The public key does not verify the private key's signatures
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, KeyLoadError> {
        if private_pem.iter().all(u8::is_ascii_whitespace) {
            return Err(KeyLoadError::MissingMaterial("private"));
        }
        if public_pem.iter().all(u8::is_ascii_whitespace) {
            return Err(KeyLoadError::MissingMaterial("public"));
        }

        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| KeyLoadError::InvalidPrivateKey(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| KeyLoadError::InvalidPublicKey(e.to_string()))?;

        let provider = Self {
            encoding_key,
            decoding_key,
        };

        // PEM parsing alone does not decode the private key structure.
        let signature = provider
            .sign(PROBE_MESSAGE)
            .map_err(|e| KeyLoadError::InvalidPrivateKey(e.to_string()))?;
        provider
            .verify(PROBE_MESSAGE, &signature)
            .map_err(|_| KeyLoadError::MismatchedPair)?;

        Ok(provider)
    }

    /// Read both PEM files from disk and load them.
    ///
    /// # Errors
    /// * `Unreadable` - A file could not be read
    /// * Any error from [`KeyProvider::from_pem`]
    pub fn from_pem_files(
        private_path: impl AsRef<Path>,
        public_path: impl AsRef<Path>,
    ) -> Result<Self, KeyLoadError> {
        let private_pem = read_key_file(private_path.as_ref())?;
        let public_pem = read_key_file(public_path.as_ref())?;
        Self::from_pem(&private_pem, &public_pem)
    }

    /// Sign a message, returning the raw signature bytes.
    ///
    /// # Errors
    /// * `EncodingFailed` - The private key could not produce a signature
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, JwtError> {
        let encoded = crypto::sign(message, &self.encoding_key, Self::ALGORITHM)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a raw signature over a message.
    ///
    /// # Errors
    /// * `InvalidSignature` - The signature does not match the message under the public key
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), JwtError> {
        let encoded = URL_SAFE_NO_PAD.encode(signature);

        match crypto::verify(&encoded, message, &self.decoding_key, Self::ALGORITHM) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(JwtError::InvalidSignature),
        }
    }
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, KeyLoadError> {
    fs::read(path).map_err(|e| KeyLoadError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
