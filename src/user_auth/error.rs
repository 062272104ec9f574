//! Auth service errors and their HTTP mapping.
//!
//! Every authentication failure maps to the same 401 response so callers
//! cannot tell an unknown email from a wrong password. Storage and
//! configuration failures are logged and answered with a generic 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::hash::HashError;
use super::token::TokenError;
use crate::config::ConfigError;
use crate::credential::StoreError;
use crate::gateway::types::{ApiResponse, error_codes};

pub const AUTH_FAILED_MSG: &str = "Invalid email or password";

#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email already registered")]
    AlreadyExists,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(#[source] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Configuration(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidCredentials | Self::InvalidToken => error_codes::AUTH_FAILED,
            Self::InvalidInput(_) => error_codes::INVALID_PARAMETER,
            Self::AlreadyExists => error_codes::ALREADY_EXISTS,
            Self::Configuration(_) | Self::Storage(_) | Self::Internal(_) => {
                error_codes::INTERNAL_ERROR
            }
        }
    }

    /// Message safe to return to clients.
    pub fn public_message(&self) -> String {
        match self {
            Self::Configuration(_) | Self::Storage(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(_) => AuthError::AlreadyExists,
            other => AuthError::Storage(other),
        }
    }
}

impl From<HashError> for AuthError {
    fn from(e: HashError) -> Self {
        match e {
            HashError::InvalidInput(msg) => AuthError::InvalidInput(msg.to_string()),
            HashError::InvalidParams(msg) => AuthError::Configuration(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired | TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Configuration => AuthError::Configuration(e.to_string()),
            TokenError::Encoding(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<ConfigError> for AuthError {
    fn from(e: ConfigError) -> Self {
        AuthError::Configuration(e.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        }
        let body = ApiResponse::<()>::error(self.code(), self.public_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_share_one_signal() {
        let login = AuthError::InvalidCredentials;
        let token = AuthError::InvalidToken;
        assert_eq!(login.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(token.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(login.code(), token.code());
        assert_eq!(login.public_message(), AUTH_FAILED_MSG);
    }

    #[test]
    fn test_storage_errors_are_opaque() {
        let err = AuthError::from(StoreError::Corrupt {
            id: 7,
            reason: "digest without salt",
        });
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_conversions() {
        assert!(matches!(
            AuthError::from(StoreError::Duplicate("a@x.com".into())),
            AuthError::AlreadyExists
        ));
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::InvalidToken
        ));
        assert!(matches!(
            AuthError::from(TokenError::Configuration),
            AuthError::Configuration(_)
        ));
        assert!(matches!(
            AuthError::from(HashError::InvalidInput("password must not be empty")),
            AuthError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_into_response_status() {
        let resp = AuthError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let resp = AuthError::AlreadyExists.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
