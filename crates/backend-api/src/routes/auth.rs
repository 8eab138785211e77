use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use smartassist_auth::{AuthSession, User};
use tracing::info;
use utoipa::ToSchema;

use crate::{
    error::FieldErrors,
    util::{require_session_token, SESSION_COOKIE},
    ApiError, AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: String,
}

impl SessionResponse {
    pub fn new(session: AuthSession, user: User) -> Self {
        Self {
            token: session.token,
            user: user.into(),
            expires_at: session.expires_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.public_id,
            name: value.name,
            email: value.email,
            role: value.role.as_str().to_string(),
        }
    }
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn cleared_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = SessionResponse),
        (status = 400, description = "Email already registered", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid registration data", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), ApiError> {
    let mut errors = FieldErrors::default();
    let name = errors.require("name", payload.name.as_deref());
    let email = errors.require("email", payload.email.as_deref());
    if email.as_deref().is_some_and(|email| !email.contains('@')) {
        errors.add("email", "The email must be a valid email address.");
    }
    let password = errors.require_exact("password", payload.password.as_deref());

    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(ApiError::validation(errors));
    };
    errors.into_result()?;

    let authenticator = state.authenticator();
    authenticator.register(&name, &email, &password).await?;
    let (user, session) = authenticator.login(&email, &password).await?;
    info!(user = %user.public_id, "account registered");

    let jar = jar.add(session_cookie(session.token.clone(), state.cookie_secure()));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse::new(session, user)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; the session cookie is set", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 422, description = "Missing email or password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let mut errors = FieldErrors::default();
    let email = errors.require("email", payload.email.as_deref());
    let password = errors.require_exact("password", payload.password.as_deref());
    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::validation(errors));
    };

    let (user, session) = state.authenticator().login(&email, &password).await?;

    let jar = jar.add(session_cookie(session.token.clone(), state.cookie_secure()));
    Ok((jar, Json(SessionResponse::new(session, user))))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 204, description = "Session ended and cookie cleared"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ApiError> {
    let token = require_session_token(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    state.authenticator().logout(&token).await?;
    info!(user = %user.public_id, "signed out");

    Ok((StatusCode::NO_CONTENT, jar.remove(cleared_cookie())))
}

#[utoipa::path(
    get,
    path = "/api/user",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let token = require_session_token(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    Ok(Json(user.into()))
}
