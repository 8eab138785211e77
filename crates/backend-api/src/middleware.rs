//! Admin gate, chat throttling and request tracing.

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use smartassist_auth::{AuthError, User};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, Level};

use crate::util::{client_key, session_token};
use crate::{ApiError, AppState};

pub const ADMIN_ONLY: &str = "Admin access only.";

/// Authenticated administrator, available to handlers behind the admin gate.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub User);

enum GateOutcome {
    Admin(User),
    Anonymous,
    NotAdmin,
}

/// Storage and hashing failures surface as errors rather than as an anonymous visitor.
async fn resolve_admin(state: &AppState, request: &Request) -> Result<GateOutcome, ApiError> {
    let Some(token) = session_token(request.headers()) else {
        return Ok(GateOutcome::Anonymous);
    };

    match state.authenticator().authenticate_token(&token).await {
        Ok((user, _)) if user.is_admin() => Ok(GateOutcome::Admin(user)),
        Ok((user, _)) => {
            debug!(user = %user.public_id, path = %request.uri().path(), "non-admin refused");
            Ok(GateOutcome::NotAdmin)
        }
        Err(
            AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidSession
            | AuthError::UserNotFound,
        ) => Ok(GateOutcome::Anonymous),
        Err(error) => Err(ApiError::from(error)),
    }
}

/// JSON admin routes: 401 without a valid session, 403 for non-admins.
pub async fn require_admin_api(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match resolve_admin(&state, &request).await? {
        GateOutcome::Admin(user) => {
            request.extensions_mut().insert(CurrentAdmin(user));
            Ok(next.run(request).await)
        }
        GateOutcome::Anonymous => Err(ApiError::unauthorized("Unauthenticated.")),
        GateOutcome::NotAdmin => Err(ApiError::forbidden(ADMIN_ONLY)),
    }
}

/// HTML admin pages: anonymous visitors go to `/login`, non-admins get a bare 403 page.
pub async fn require_admin_page(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_admin(&state, &request).await {
        Ok(GateOutcome::Admin(user)) => {
            request.extensions_mut().insert(CurrentAdmin(user));
            next.run(request).await
        }
        Ok(GateOutcome::Anonymous) => Redirect::to("/login").into_response(),
        Ok(GateOutcome::NotAdmin) => (StatusCode::FORBIDDEN, Html(ADMIN_ONLY)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn throttle_chat(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let limiter = state.chat_limiter();
    let client = client_key(request.headers(), request.extensions(), limiter.trusted_proxies());

    match limiter.check(&client) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            let mut response =
                ApiError::too_many_requests("Too many requests. Please slow down.").into_response();
            let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&seconds.max(1).to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
            response
        }
    }
}

pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
