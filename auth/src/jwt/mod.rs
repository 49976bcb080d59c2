pub mod claims;
pub mod codec;
pub mod errors;
pub mod keys;

pub use claims::Header;
pub use claims::Payload;
pub use codec::DecodedToken;
pub use errors::JwtError;
pub use errors::KeyLoadError;
pub use keys::KeyProvider;
