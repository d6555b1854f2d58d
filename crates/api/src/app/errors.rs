//! The single mapping from service failures to HTTP responses.
//!
//! Body shape: `{ "error": code, "message": text, "field"?: name }`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use roster_auth::{AuthzError, CredentialError, TokenError};
use roster_core::DomainError;

/// Caller-visible message for every rejected bearer or refresh token.
const TOKEN_REJECTED: &str = "token is invalid or expired";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, expired or forged credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// Login (or current-password) check failed.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Validation { field: Option<String>, message: String },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated("authentication required".to_string())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) | ApiError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::InvalidCredentials(_) => "invalid_credentials",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation { .. } => "validation_error",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Unauthenticated => ApiError::unauthenticated(),
            other => ApiError::Forbidden(other.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation { field, message } => ApiError::Validation {
                field: Some(field),
                message,
            },
            DomainError::InvalidId(message) => ApiError::validation("id", message),
            DomainError::NotFound => ApiError::NotFound("user not found".to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Expired | TokenError::Invalid(_) => {
                debug!(reason = %value, "token rejected");
                ApiError::Unauthenticated(TOKEN_REJECTED.to_string())
            }
            TokenError::Signing(message) => ApiError::Internal(message),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(value: CredentialError) -> Self {
        match value {
            CredentialError::InvalidCredentials => ApiError::InvalidCredentials(value.to_string()),
            CredentialError::Token(e) => e.into(),
            CredentialError::Hashing(e) => ApiError::Internal(e.to_string()),
            CredentialError::Domain(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::Validation {
            field: None,
            message: value.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        match self {
            ApiError::Validation { field: Some(field), message } => {
                (status, axum::Json(json!({ "error": code, "message": message, "field": field }))).into_response()
            }
            ApiError::Internal(detail) => {
                error!(%detail, "request failed");
                json_error(status, code, "internal server error")
            }
            other => json_error(status, code, other.to_string()),
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
