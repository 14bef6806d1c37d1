//! Common error types and the global error-to-HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message returned to clients for every 5xx; the real cause is only logged.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the relocation CRM
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid argument: {0}")]
    BadArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body: `{ "title": ..., "errors": [...] }`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub title: &'static str,
    pub errors: Vec<String>,
}

impl Error {
    /// Single-message validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(vec![message.into()])
    }

    /// Not-found error for an entity kind and id
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Error::NotFound(format!("{} with id '{}' was not found", entity, id))
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::BadArgument(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateEmail(_) | Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Unauthorized(_) => StatusCode::FORBIDDEN,
            Error::Unexpected(_)
            | Error::Database(_)
            | Error::Serialization(_)
            | Error::Storage(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Title for the error response body
    pub fn title(&self) -> &'static str {
        match self {
            Error::Validation(_) => "Validation failed",
            Error::BadArgument(_) => "Invalid argument",
            Error::NotFound(_) => "Resource not found",
            Error::DuplicateEmail(_) => "Duplicate email",
            Error::Conflict(_) => "Conflict",
            Error::Unauthorized(_) => "Forbidden",
            Error::Unexpected(_)
            | Error::Database(_)
            | Error::Serialization(_)
            | Error::Storage(_)
            | Error::Internal(_) => "An unexpected error occurred",
        }
    }

    /// Messages exposed to the client. 5xx errors are redacted.
    pub fn client_messages(&self) -> Vec<String> {
        match self {
            Error::Validation(messages) => messages.clone(),
            Error::BadArgument(msg)
            | Error::NotFound(msg)
            | Error::DuplicateEmail(msg)
            | Error::Conflict(msg)
            | Error::Unauthorized(msg) => vec![msg.clone()],
            _ => vec![GENERIC_ERROR_MESSAGE.to_string()],
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            title: self.title(),
            errors: self.client_messages(),
        }
    }
}

/// Flatten nested validator errors into `path: message` strings
fn collect_validation_messages(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    out.push(match &e.message {
                        Some(msg) => format!("{}: {}", path, msg),
                        None => format!("{}: invalid value ({})", path, e.code),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_messages(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages("", &errors, &mut messages);
        messages.sort();
        if messages.is_empty() {
            messages.push(errors.to_string());
        }
        Error::Validation(messages)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, error_debug = ?self, "Unhandled error");
        } else {
            tracing::debug!(error = %self, status = %status, "Request failed");
        }

        (status, Json(self.body())).into_response()
    }
}
