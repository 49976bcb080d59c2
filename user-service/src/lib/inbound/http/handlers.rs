use auth::CredentialError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::user::errors::TransactionError;
use crate::domain::user::errors::UserError;

pub mod get_current_user;
pub mod register_user;
pub mod update_current_user;

/// Body of every unauthorized response, whatever the cause.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Successful reply, rendered as the `{ status_code, data }` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSuccess<T: Serialize> {
    status: StatusCode,
    data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self { status, data }
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        envelope(self.status, self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    NotFound(String),
    Conflict(String),
    Unauthorized,
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE.to_string()),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        envelope(status, ApiErrorData { message })
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::DuplicateAccount(_) => ApiError::Conflict(err.to_string()),
            UserError::MissingIdentity => ApiError::Unauthorized,
            UserError::InvalidUserId(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidDisplayName(_)
            | UserError::Credential(CredentialError::Empty) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            UserError::Transaction(TransactionError::TimedOut) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            UserError::Credential(_)
            | UserError::TokenIssuance(_)
            | UserError::Transaction(_)
            | UserError::DatabaseError(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct Envelope<T> {
    status_code: u16,
    data: T,
}

fn envelope<T: Serialize>(status: StatusCode, data: T) -> Response {
    let body = Envelope {
        status_code: status.as_u16(),
        data,
    };
    (status, Json(body)).into_response()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}
