use crate::engine::EngineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Engine(EngineError::AlreadyRunning) => {
                (StatusCode::CONFLICT, "ALREADY_RUNNING")
            }
            ApiError::Engine(EngineError::ConfigLocked) => (StatusCode::CONFLICT, "CONFIG_LOCKED"),
            ApiError::Engine(EngineError::Config(_)) | ApiError::InvalidConfig(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_CONFIG")
            }
            ApiError::Engine(EngineError::Delivery(_)) | ApiError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let body = Json(json!({
            "error": self.to_string(),
            "code": error_code,
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
