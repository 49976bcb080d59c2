use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::context::AuthenticatedUser;
use crate::context::RequestContext;
use crate::domain::auth::gate;
use crate::domain::auth::GateOutcome;
use crate::domain::auth::InboundCall;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

impl InboundCall for Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    fn attach_user(&mut self, user: AuthenticatedUser) {
        let ctx = self
            .extensions_mut()
            .remove::<RequestContext>()
            .unwrap_or_default()
            .with_user(user);
        self.extensions_mut().insert(ctx);
    }
}

/// Middleware that gives every request a fresh [`RequestContext`] carrying
/// the configured transaction timeout.
pub async fn request_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::new().with_transaction_timeout(state.transaction_timeout);
    req.extensions_mut().insert(ctx);

    next.run(req).await
}

/// Middleware that runs the authentication gate and stops the request with
/// a uniform 401 when it fails.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match gate::authenticate(&mut req, &state.token_service) {
        GateOutcome::PassThrough => next.run(req).await,
        GateOutcome::Unauthorized(_) => ApiError::Unauthorized.into_response(),
    }
}
