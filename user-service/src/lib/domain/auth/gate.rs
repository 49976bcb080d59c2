//! Bearer token gate, independent of any routing library.
//!
//! A routing adapter implements [`InboundCall`] for its request type and
//! calls [`authenticate`] once per protected request. The gate only ever
//! ends in two states: the caller's identity is attached and the request
//! continues, or the request stops with an unauthorized outcome.

use std::fmt;

use auth::TokenService;

use crate::context::AuthenticatedUser;

pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const BEARER_SCHEME: &str = "Bearer";

/// What the gate needs from an inbound request.
pub trait InboundCall {
    /// Header value by (case-insensitive) name, if present and valid text.
    fn header(&self, name: &str) -> Option<&str>;

    /// Make the identity visible to downstream handlers.
    fn attach_user(&mut self, user: AuthenticatedUser);
}

/// Terminal state of the gate for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    PassThrough,
    Unauthorized(Rejection),
}

/// Internal reason for an unauthorized outcome.
///
/// Only for logs; callers must not see which one happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingHeader,
    MalformedScheme,
    InvalidToken(String),
    MissingUserId,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingHeader => f.write_str("missing authorization header"),
            Rejection::MalformedScheme => f.write_str("authorization header is not 'Bearer <token>'"),
            Rejection::InvalidToken(reason) => write!(f, "invalid token: {}", reason),
            Rejection::MissingUserId => f.write_str("token carries no userId"),
        }
    }
}

/// Run the gate over one inbound call.
///
/// The header value must be exactly two space-separated parts, the first
/// equal to `Bearer` ignoring ASCII case. On success the call carries the
/// token's `userId` (and email, when present).
///
/// # Arguments
/// * `call` - Inbound request binding
/// * `tokens` - Token service deciding whether the token is acceptable
pub fn authenticate<C>(call: &mut C, tokens: &TokenService) -> GateOutcome
where
    C: InboundCall + ?Sized,
{
    match resolve_identity(call, tokens) {
        Ok(user) => {
            tracing::debug!(user_id = %user.user_id, "Request authenticated");
            call.attach_user(user);
            GateOutcome::PassThrough
        }
        Err(rejection) => {
            tracing::warn!(reason = %rejection, "Request rejected by authentication gate");
            GateOutcome::Unauthorized(rejection)
        }
    }
}

fn resolve_identity<C>(call: &C, tokens: &TokenService) -> Result<AuthenticatedUser, Rejection>
where
    C: InboundCall + ?Sized,
{
    let value = call
        .header(AUTHORIZATION_HEADER)
        .ok_or(Rejection::MissingHeader)?;

    let token = match value.split(' ').collect::<Vec<_>>().as_slice() {
        &[scheme, token] if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => token,
        _ => return Err(Rejection::MalformedScheme),
    };

    let payload = tokens
        .validate_and_decode(token)
        .map_err(|e| Rejection::InvalidToken(e.to_string()))?;

    let user_id = payload
        .user_id()
        .filter(|id| !id.is_empty())
        .ok_or(Rejection::MissingUserId)?;

    Ok(AuthenticatedUser {
        user_id: user_id.to_string(),
        email: payload.email().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use auth::jwt::codec;
    use auth::Header;
    use auth::KeyProvider;
    use auth::Payload;

    use super::*;

    const PRIVATE_PEM: &[u8] = include_bytes!("../../../../../auth/testdata/rsa_private.pem");
    const PUBLIC_PEM: &[u8] = include_bytes!("../../../../../auth/testdata/rsa_public.pem");
    const OTHER_PRIVATE_PEM: &[u8] =
        include_bytes!("../../../../../auth/testdata/other_rsa_private.pem");
    const OTHER_PUBLIC_PEM: &[u8] =
        include_bytes!("../../../../../auth/testdata/other_rsa_public.pem");

    #[derive(Default)]
    struct FakeCall {
        headers: HashMap<String, String>,
        user: Option<AuthenticatedUser>,
    }

    impl FakeCall {
        fn with_authorization(value: &str) -> Self {
            let mut call = Self::default();
            call.headers
                .insert(AUTHORIZATION_HEADER.to_string(), value.to_string());
            call
        }
    }

    impl InboundCall for FakeCall {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
        }

        fn attach_user(&mut self, user: AuthenticatedUser) {
            self.user = Some(user);
        }
    }

    fn token_service() -> TokenService {
        TokenService::new(KeyProvider::from_pem(PRIVATE_PEM, PUBLIC_PEM).unwrap())
    }

    fn assert_rejected(value: &str, tokens: &TokenService) {
        let mut call = FakeCall::with_authorization(value);
        assert!(
            matches!(authenticate(&mut call, tokens), GateOutcome::Unauthorized(_)),
            "header {:?} should be rejected",
            value
        );
        assert!(call.user.is_none());
    }

    #[test]
    fn test_valid_token_attaches_identity() {
        let tokens = token_service();
        let issued = tokens.issue("u1", "a@example.com").unwrap();

        let mut call = FakeCall::with_authorization(&format!("Bearer {}", issued.token));
        assert_eq!(authenticate(&mut call, &tokens), GateOutcome::PassThrough);
        assert_eq!(
            call.user,
            Some(AuthenticatedUser {
                user_id: "u1".to_string(),
                email: Some("a@example.com".to_string()),
            })
        );
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let tokens = token_service();
        let issued = tokens.issue("u1", "a@example.com").unwrap();

        for scheme in ["bearer", "BEARER", "bEaReR"] {
            let mut call = FakeCall::with_authorization(&format!("{} {}", scheme, issued.token));
            assert_eq!(authenticate(&mut call, &tokens), GateOutcome::PassThrough);
        }
    }

    #[test]
    fn test_missing_header() {
        let tokens = token_service();
        let mut call = FakeCall::default();

        assert_eq!(
            authenticate(&mut call, &tokens),
            GateOutcome::Unauthorized(Rejection::MissingHeader)
        );
        assert!(call.user.is_none());
    }

    #[test]
    fn test_malformed_scheme() {
        let tokens = token_service();
        let issued = tokens.issue("u1", "a@example.com").unwrap();

        let candidates = [
            issued.token.clone(),
            format!("Token {}", issued.token),
            format!("Basic {}", issued.token),
            format!("Bearer  {}", issued.token),
            format!("Bearer {} extra", issued.token),
            "Bearer".to_string(),
        ];

        for value in candidates {
            let mut call = FakeCall::with_authorization(&value);
            assert_eq!(
                authenticate(&mut call, &tokens),
                GateOutcome::Unauthorized(Rejection::MalformedScheme)
            );
        }
    }

    #[test]
    fn test_invalid_token() {
        let tokens = token_service();
        let issued = tokens.issue("u1", "a@example.com").unwrap();

        let mut tampered = issued.token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_rejected("Bearer not.a.token", &tokens);
        assert_rejected("Bearer ", &tokens);
        assert_rejected(&format!("Bearer {}", tampered), &tokens);
    }

    #[test]
    fn test_token_from_other_key() {
        let tokens = token_service();
        let foreign = TokenService::new(
            KeyProvider::from_pem(OTHER_PRIVATE_PEM, OTHER_PUBLIC_PEM).unwrap(),
        );
        let issued = foreign.issue("u1", "a@example.com").unwrap();

        assert_rejected(&format!("Bearer {}", issued.token), &tokens);
    }

    #[test]
    fn test_token_without_user_id() {
        let keys = KeyProvider::from_pem(PRIVATE_PEM, PUBLIC_PEM).unwrap();
        let tokens = token_service();

        let payload = Payload::new().with_claim("email", "a@example.com");
        let token = codec::encode(&Header::default(), &payload, &keys).unwrap();

        let mut call = FakeCall::with_authorization(&format!("Bearer {}", token));
        assert_eq!(
            authenticate(&mut call, &tokens),
            GateOutcome::Unauthorized(Rejection::MissingUserId)
        );
    }
}
