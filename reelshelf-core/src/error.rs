use thiserror::Error;

use crate::auth::{crypto::AuthCryptoError, token::TokenError};

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Account has not been confirmed")]
    Unconfirmed,

    #[error("No copies of '{0}' are left in stock")]
    OutOfStock(String),

    #[error("Borrow quota exhausted")]
    QuotaExceeded,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Token was not issued for this account")]
    TokenMismatch,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] AuthCryptoError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for ShelfError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                ShelfError::NotFound("row not found".to_string())
            }
            other => ShelfError::Database(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;
