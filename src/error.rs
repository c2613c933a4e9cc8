//! Error types for MagicStream

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;

use crate::api::routes::ApiResponse;

/// Why a token could not be accepted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token was signed with an unexpected algorithm")]
    UnexpectedAlgorithm,

    #[error("token has expired")]
    Expired,
}

/// Internal reason behind an `Unauthenticated` rejection.
///
/// Only ever logged; clients always see the same generic response.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("no token cookie on the request")]
    MissingToken,

    #[error("token cookie is empty")]
    EmptyToken,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user no longer exists")]
    UnknownUser,

    #[error("request carries no identity")]
    MissingIdentity,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(AuthFailure),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Token signing error: {0}")]
    Signing(String),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found. Run 'magicstream init' first.")]
    ConfigNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Sentiment classification error: {0}")]
    Sentiment(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to a client
    pub fn public_message(&self) -> String {
        match self {
            Error::Unauthenticated(_) => "Unauthenticated".to_string(),
            Error::Forbidden(msg)
            | Error::Conflict(msg)
            | Error::NotFound(msg)
            | Error::Validation(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl From<TokenError> for Error {
    fn from(err: TokenError) -> Self {
        Error::Unauthenticated(AuthFailure::Token(err))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Error::Validation(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Error::Unauthenticated(reason) => tracing::warn!("Rejected request: {}", reason),
            _ if status.is_server_error() => tracing::error!("Request failed: {}", self),
            _ => tracing::debug!("Request refused: {}", self),
        }

        (status, Json(ApiResponse::<()>::err(self.public_message()))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
