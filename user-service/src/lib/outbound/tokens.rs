use auth::TokenService;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::TokenIssuer;

/// Registration-side view of the token service.
impl TokenIssuer for TokenService {
    fn issue(&self, user_id: &UserId, email: &EmailAddress) -> Result<String, UserError> {
        TokenService::issue(self, &user_id.to_string(), email.as_str())
            .map(|issued| issued.token)
            .map_err(|e| UserError::TokenIssuance(e.to_string()))
    }
}
