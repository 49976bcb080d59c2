use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

pub const TOKEN_TYPE: &str = "JWT";
pub const ALGORITHM: &str = "RS256";

pub const JTI: &str = "jti";
pub const USER_ID: &str = "userId";
pub const EMAIL: &str = "email";

/// Token header: type tag and signature algorithm tag.
///
/// Field order fixes the serialized form to `{"alg":"RS256","typ":"JWT"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
    pub typ: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}

/// Token payload: an open string-to-string map.
///
/// Backed by a `BTreeMap` so the JSON encoding of a given map is always the
/// same byte sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, String>);

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload carrying the identity fields of an issued token.
    pub fn for_user(
        jti: impl Into<String>,
        user_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self::new()
            .with_claim(JTI, jti)
            .with_claim(USER_ID, user_id)
            .with_claim(EMAIL, email)
    }

    /// Add or replace a field.
    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn jti(&self) -> Option<&str> {
        self.get(JTI)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.get(USER_ID)
    }

    pub fn email(&self) -> Option<&str> {
        self.get(EMAIL)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for Payload {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_serialization() {
        let json = serde_json::to_string(&Header::default()).unwrap();
        assert_eq!(json, r#"{"alg":"RS256","typ":"JWT"}"#);
    }

    #[test]
    fn test_for_user() {
        let payload = Payload::for_user("id-1", "u1", "a@example.com");

        assert_eq!(payload.jti(), Some("id-1"));
        assert_eq!(payload.user_id(), Some("u1"));
        assert_eq!(payload.email(), Some("a@example.com"));
        assert_eq!(payload.len(), 3);
    }

    #[test]
    fn test_payload_serialization_is_sorted() {
        let payload = Payload::new()
            .with_claim("userId", "u1")
            .with_claim("jti", "id-1")
            .with_claim("email", "a@example.com");

        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"email":"a@example.com","jti":"id-1","userId":"u1"}"#);
    }

    #[test]
    fn test_payload_rejects_non_string_values() {
        let result = serde_json::from_str::<Payload>(r#"{"userId":42}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_with_claim_replaces() {
        let payload = Payload::new()
            .with_claim("role", "user")
            .with_claim("role", "admin");
        assert_eq!(payload.get("role"), Some("admin"));
        assert_eq!(payload.len(), 1);
    }
}
