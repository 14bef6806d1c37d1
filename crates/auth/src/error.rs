//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relocrm_common::error::{ErrorBody, GENERIC_ERROR_MESSAGE};

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    MissingAuthorization,
    InvalidAuthorizationFormat,
    InvalidToken,
    MissingEmail,
    UserLoadError,
    UserProvisionFailed,
    AuthenticationFailed,
    /// Caller's role does not allow this operation
    InsufficientRole,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthorization
            | AuthError::InvalidAuthorizationFormat
            | AuthError::InvalidToken
            | AuthError::MissingEmail => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::UserLoadError
            | AuthError::UserProvisionFailed
            | AuthError::AuthenticationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "Authorization header required",
            AuthError::InvalidAuthorizationFormat => "Invalid authorization header format",
            AuthError::InvalidToken => "Invalid or expired token",
            AuthError::MissingEmail => "Token does not carry an email claim",
            AuthError::InsufficientRole => "Only administrators can perform this operation",
            AuthError::UserLoadError
            | AuthError::UserProvisionFailed
            | AuthError::AuthenticationFailed => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let title = match status {
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            _ => "An unexpected error occurred",
        };

        let body = Json(ErrorBody {
            title,
            errors: vec![self.message().to_string()],
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_status_codes() {
        let cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::MissingAuthorization, StatusCode::UNAUTHORIZED),
            (
                AuthError::InvalidAuthorizationFormat,
                StatusCode::UNAUTHORIZED,
            ),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::MissingEmail, StatusCode::UNAUTHORIZED),
            (AuthError::UserLoadError, StatusCode::INTERNAL_SERVER_ERROR),
            (
                AuthError::UserProvisionFailed,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::AuthenticationFailed,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AuthError::InsufficientRole, StatusCode::FORBIDDEN),
        ];

        for (error, expected_status) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }
}
