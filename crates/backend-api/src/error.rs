use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use smartassist_auth::AuthError;
use smartassist_database::DatabaseError;
use smartassist_orchestrator::OrchestratorError;
use tracing::{error, warn};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// Field name to validation messages, present on 422 responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 422 carrying every failed field. The headline message is the first one reported.
    pub fn validation(errors: FieldErrors) -> Self {
        let message = errors
            .first_message()
            .unwrap_or("The given data was invalid.")
            .to_string();

        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message,
            errors: Some(errors.0),
        }
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.add(field, message);
        Self::validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            message: self.message,
            errors: self.errors,
        });
        (self.status, body).into_response()
    }
}

/// Accumulates per-field validation failures before answering with a single 422.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record "field is required" when `value` is missing or blank. Returns the trimmed value.
    pub fn require(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Some(value.to_string()),
            None => {
                self.add(field, format!("The {} field is required.", field.replace('_', " ")));
                None
            }
        }
    }

    /// Like [`FieldErrors::require`] but keeps the value byte for byte. Used for passwords.
    pub fn require_exact(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.filter(|value| !value.is_empty()) {
            Some(value) => Some(value.to_string()),
            None => {
                self.add(field, format!("The {} field is required.", field.replace('_', " ")));
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn first_message(&self) -> Option<&str> {
        self.0
            .values()
            .next()
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self))
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(error = ?error, "internal error");
        Self::internal_server_error("Internal server error.")
    }
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        if error.is_not_found() {
            return Self::not_found("Not found.");
        }
        error!(error = ?error, "database error");
        Self::internal_server_error("Database operation failed.")
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(error: OrchestratorError) -> Self {
        error!(error = ?error, "orchestrator error");
        let status = match error {
            OrchestratorError::NoProviders => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, error.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => Self::unauthorized("Invalid credentials."),
            AuthError::SessionNotFound | AuthError::SessionExpired | AuthError::InvalidSession => {
                warn!(%error, "rejected session token");
                Self::unauthorized("Unauthenticated.")
            }
            AuthError::UserExists => Self::bad_request("The email has already been taken."),
            AuthError::WeakPassword => Self::invalid_field("password", error.to_string()),
            AuthError::UserNotFound => Self::not_found("User not found."),
            AuthError::Database(_) | AuthError::PasswordHash(_) => {
                error!(error = ?error, "auth error");
                Self::internal_server_error("Internal server error.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_trims_and_reports_blank_fields() {
        let mut errors = FieldErrors::default();
        assert_eq!(errors.require("question", Some("  Fees?  ")), Some("Fees?".to_string()));
        assert_eq!(errors.require("session_id", Some("   ")), None);
        assert_eq!(errors.require("answer", None), None);

        let error = errors.into_result().expect_err("two fields failed");
        assert_eq!(error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.message, "The answer field is required.");

        let fields = error.errors.expect("field errors");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["session_id"], vec!["The session id field is required."]);
    }

    #[test]
    fn require_exact_keeps_surrounding_whitespace() {
        let mut errors = FieldErrors::default();
        assert_eq!(
            errors.require_exact("password", Some(" padded-secret ")),
            Some(" padded-secret ".to_string())
        );
        assert!(errors.is_empty());

        assert_eq!(errors.require_exact("password", Some("")), None);
        assert!(!errors.is_empty());
    }

    #[test]
    fn session_errors_map_to_unauthorized() {
        let error = ApiError::from(AuthError::SessionExpired);
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.message, "Unauthenticated.");
    }

    #[test]
    fn missing_rows_map_to_not_found() {
        let error = ApiError::from(DatabaseError::not_found("faq 7"));
        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }
}
