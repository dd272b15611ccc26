use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reminder_shared::{config::ConfigError, error::ServiceError, models::ErrorResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    MissingConfig(#[from] ConfigError),

    /// Carries the resolver's reason for the logs; the caller only sees "Unauthorized".
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    StoreRejected(String),

    #[error("{0}")]
    Unexpected(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized(msg) => AppError::Unauthorized(msg),
            ServiceError::StoreRejected(msg) => AppError::StoreRejected(msg),
            other => AppError::Unexpected(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MethodNotAllowed => {
                tracing::warn!("Rejected request with unsupported method");
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
            }
            AppError::MissingConfig(err) => {
                tracing::error!("Service misconfigured: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AppError::Unauthorized(reason) => {
                tracing::warn!("Unauthorized error: {}", reason);
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            AppError::StoreRejected(msg) => {
                tracing::warn!("Store rejected insert: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::Unexpected(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        tracing::info!("Returning error response: status={}", status);
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
