use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use reelshelf_core::{ShelfError, auth::TokenError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Mapping for endpoints that consume a mailed account token. A bad
    /// link there is a malformed request, not a failed login.
    pub fn from_account_token(err: ShelfError) -> Self {
        match err {
            ShelfError::Token(_) | ShelfError::TokenMismatch => {
                Self::bad_request(account_token_message(&err))
            }
            other => other.into(),
        }
    }
}

fn account_token_message(err: &ShelfError) -> &'static str {
    match err {
        ShelfError::Token(TokenError::Expired) => "The link has expired",
        ShelfError::TokenMismatch => "The link was issued for another account",
        _ => "The link is invalid",
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<ShelfError> for AppError {
    fn from(err: ShelfError) -> Self {
        match err {
            ShelfError::NotFound(msg) => Self::not_found(msg),
            ShelfError::Conflict(_)
            | ShelfError::OutOfStock(_)
            | ShelfError::QuotaExceeded => Self::conflict(err.to_string()),
            ShelfError::InvalidCredentials
            | ShelfError::Unauthenticated
            | ShelfError::TokenMismatch
            | ShelfError::Token(_) => Self::unauthorized(err.to_string()),
            ShelfError::PermissionDenied(_) | ShelfError::Unconfirmed => {
                Self::forbidden(err.to_string())
            }
            ShelfError::Validation(msg) => Self::bad_request(msg),
            ShelfError::Crypto(_)
            | ShelfError::Database(_)
            | ShelfError::Internal(_) => {
                tracing::error!(error = %err, "request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_statuses() {
        let cases = [
            (ShelfError::NotFound("movie".into()), StatusCode::NOT_FOUND),
            (ShelfError::Conflict("title".into()), StatusCode::CONFLICT),
            (ShelfError::OutOfStock("Heat".into()), StatusCode::CONFLICT),
            (ShelfError::QuotaExceeded, StatusCode::CONFLICT),
            (ShelfError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ShelfError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                ShelfError::Token(TokenError::BadSignature),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ShelfError::PermissionDenied("nope".into()),
                StatusCode::FORBIDDEN,
            ),
            (ShelfError::Unconfirmed, StatusCode::FORBIDDEN),
            (ShelfError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                ShelfError::Database("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn account_token_failures_are_bad_requests() {
        let expired = AppError::from_account_token(ShelfError::Token(TokenError::Expired));
        assert_eq!(expired.status, StatusCode::BAD_REQUEST);
        assert_eq!(expired.message, "The link has expired");

        let mismatch = AppError::from_account_token(ShelfError::TokenMismatch);
        assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);

        let other = AppError::from_account_token(ShelfError::InvalidCredentials);
        assert_eq!(other.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::from(ShelfError::Database("password=hunter2".into()));
        assert_eq!(err.message, "Internal server error");
    }
}
