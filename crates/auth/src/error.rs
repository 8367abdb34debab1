use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Auth errors for the mocksaml_auth crate.
///
/// This wraps the core `AuthError` and adds the variants that only make
/// sense at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (session lookup, storage, backend).
    #[error(transparent)]
    Core(#[from] mocksaml_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The authentication backend produced no user for the assertion.
    #[error("permission denied")]
    PermissionDenied,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use mocksaml_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::InvalidUserTable(_) | CoreError::InvalidAttributeMapping(_) => {
                    tracing::error!("Config error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server configuration error".to_string(),
                    )
                }
                CoreError::MissingSessionKey(_) | CoreError::Storage(_) => {
                    tracing::error!("Auth error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            AuthError::Config(_) => {
                tracing::error!("Config error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
            AuthError::PermissionDenied => (StatusCode::FORBIDDEN, "Permission denied".to_string()),
        };

        (status, message).into_response()
    }
}
