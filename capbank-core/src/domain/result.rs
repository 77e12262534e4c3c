//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validation::ValidationReport;

/// Message shown when the server gives nothing usable
pub const GENERIC_ERROR_MESSAGE: &str = "Unknown error";

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Local form validation failed; no request was sent
    #[error("Validation error: {0}")]
    Validation(ValidationReport),

    /// Login was rejected
    #[error("{0}")]
    Auth(String),

    /// The server answered 401; the session has been cleared
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// Any other non-2xx response, message taken from the body
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never got a response
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an API error from a status and a user facing message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a session error
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// True when the failure happened before any request was made
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Message suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(report) => report
                .first_message()
                .unwrap_or(GENERIC_ERROR_MESSAGE)
                .to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationReport> for Error {
    fn from(report: ValidationReport) -> Self {
        Self::Validation(report)
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.user_message()),
        }
    }
}
