pub mod argon2;
pub mod errors;

pub use self::argon2::CredentialHasher;
pub use errors::CredentialError;
