use axum::extract::State;
use axum::http::header;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::context::RequestContext;
use crate::domain::auth::gate::BEARER_SCHEME;
use crate::domain::user::errors::EmailError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Registration;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

pub type RegisterUserResponse = (
    [(HeaderName, String); 1],
    ApiSuccess<RegisterUserResponseData>,
);

/// Register an account and return its first access token, both in the
/// body and as an `Authorization: Bearer <token>` header.
pub async fn register_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<RegisterUserResponse, ApiError> {
    let registration = state
        .user_service
        .register_and_issue_token(&ctx, body.try_into_command()?)
        .await?;

    let authorization = format!("{} {}", BEARER_SCHEME, registration.token);

    Ok((
        [(header::AUTHORIZATION, authorization)],
        ApiSuccess::new(StatusCode::CREATED, (&registration).into()),
    ))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    email: String,
    password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterUserRequestError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Password must not be empty")]
    EmptyPassword,
}

impl RegisterUserRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, ParseRegisterUserRequestError> {
        let email = EmailAddress::new(self.email)?;
        if self.password.is_empty() {
            return Err(ParseRegisterUserRequestError::EmptyPassword);
        }
        Ok(RegisterUserCommand::new(email, self.password))
    }
}

impl From<ParseRegisterUserRequestError> for ApiError {
    fn from(err: ParseRegisterUserRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterUserResponseData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

impl From<&Registration> for RegisterUserResponseData {
    fn from(registration: &Registration) -> Self {
        Self {
            id: registration.user.id.to_string(),
            name: registration.user.name.as_str().to_string(),
            email: registration.user.email.as_str().to_string(),
            token: registration.token.clone(),
        }
    }
}
