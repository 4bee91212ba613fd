//! Unified API error handling.
//!
//! All failures are returned in the standard JSON envelope
//! `{"success": false, "message": "..."}` with an optional `field` hint
//! naming the input that failed, and an appropriate HTTP status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Client errors (4xx)
    BadRequest,
    ValidationError,
    DuplicateEmail,
    InvalidCredentials,
    InvalidOrExpiredToken,
    Unauthorized,
    Forbidden,
    NotFound,
    TooManyRequests,

    // Server errors (5xx)
    InternalError,
    DatabaseError,
}

impl ErrorCode {
    /// Get the default HTTP status code for this error code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::DuplicateEmail => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::DuplicateEmail => "duplicate_email",
            ErrorCode::InvalidCredentials => "invalid_credentials",
            ErrorCode::InvalidOrExpiredToken => "invalid_or_expired_token",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::Forbidden => "forbidden",
            ErrorCode::NotFound => "not_found",
            ErrorCode::TooManyRequests => "too_many_requests",
            ErrorCode::InternalError => "internal_error",
            ErrorCode::DatabaseError => "database_error",
        }
    }
}

/// The error response envelope sent over the wire
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    /// The error code
    code: ErrorCode,
    /// HTTP status code (defaults to code's default status)
    status: StatusCode,
    /// Human-readable error message
    message: String,
    /// Name of the input field that failed, when one can be singled out
    field: Option<String>,
}

impl ApiError {
    /// Create a new API error with a specific code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status_code(),
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Create an API error with a custom HTTP status code
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Attach the name of the failing input field
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // -------------------------------------------------------------------------
    // Convenience constructors for common error types
    // -------------------------------------------------------------------------

    /// Bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Validation error (400)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Validation error (400) naming the failing field
    pub fn validation_field(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message).with_field(field)
    }

    /// Duplicate email error (400)
    pub fn duplicate_email() -> Self {
        Self::new(ErrorCode::DuplicateEmail, "User already exists with this email")
            .with_field("email")
    }

    /// Invalid credentials (401); the same body for unknown email and
    /// wrong password so responses do not aid account enumeration
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials, "Invalid email or password")
    }

    /// Invalid or expired token (400), used by the password-reset flow
    pub fn invalid_token() -> Self {
        Self::new(ErrorCode::InvalidOrExpiredToken, "Invalid or expired reset token")
    }

    /// Unauthorized error (401) - authentication required
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Forbidden error (403) - authenticated but not allowed
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Too many requests error (429)
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TooManyRequests, message)
    }

    /// Internal server error (500)
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error (500)
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// The error code, for branching in tests and logs
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The user-facing message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = ErrorResponse {
            success: false,
            message: self.message,
            field: self.field,
        };

        (self.status, Json(response)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

// -------------------------------------------------------------------------
// Conversion implementations for common error types
// -------------------------------------------------------------------------

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);

        // Check for specific SQLx errors
        match &err {
            sqlx::Error::RowNotFound => ApiError::not_found("Resource not found"),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                // The only UNIQUE constraint in the schema is on email
                if msg.contains("UNIQUE constraint failed") {
                    ApiError::duplicate_email()
                } else {
                    ApiError::database("A database error occurred")
                }
            }
            _ => ApiError::database("A database error occurred"),
        }
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal("Failed to process password")
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::error!("Token signing error: {}", err);
        ApiError::internal("Failed to issue token")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_codes() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::ValidationError.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::DuplicateEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::InvalidOrExpiredToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::TooManyRequests.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::not_found("Caterer not found");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Caterer not found");
        assert!(err.field.is_none());
    }

    #[test]
    fn test_duplicate_email_names_the_field() {
        let err = ApiError::duplicate_email();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("email"));
    }

    #[test]
    fn test_envelope_shape() {
        let body = ErrorResponse {
            success: false,
            message: "Invalid email or password".to_string(),
            field: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid email or password");
        // The field hint is omitted entirely when absent
        assert!(json.get("field").is_none());
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_custom_status_code() {
        let err = ApiError::new(ErrorCode::InternalError, "Email could not be sent")
            .with_status(StatusCode::BAD_GATEWAY);

        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
