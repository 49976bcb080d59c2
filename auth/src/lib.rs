//! Token and credential primitives for the user service.
//!
//! - Key provider: RSA key pair loaded once from PEM material
//! - Codec: self-contained signed tokens (`header.payload.signature`)
//! - Token service: issue tokens for an identity, validate incoming ones
//! - Credential hashing (Argon2id)
//!
//! # Examples
//!
//! ```no_run
//! use auth::{KeyProvider, TokenService};
//!
//! let keys = KeyProvider::from_pem_files("keys/private.pem", "keys/public.pem").unwrap();
//! let tokens = TokenService::new(keys);
//!
//! let issued = tokens.issue("user-123", "alice@example.com").unwrap();
//! let payload = tokens.validate_and_decode(&issued.token).unwrap();
//! assert_eq!(payload.user_id(), Some("user-123"));
//! ```

pub mod credential;
pub mod jwt;
pub mod token_service;

pub use credential::CredentialError;
pub use credential::CredentialHasher;
pub use jwt::Header;
pub use jwt::JwtError;
pub use jwt::KeyLoadError;
pub use jwt::KeyProvider;
pub use jwt::Payload;
pub use token_service::AuthenticationError;
pub use token_service::IssuedToken;
pub use token_service::TokenService;
