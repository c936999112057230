//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了HTTP接口的错误响应。

use crate::error::FlagError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

/// 错误码
pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const UNAVAILABLE: &str = "unavailable";
    pub const OPERATION_FAILED: &str = "operation_failed";
    pub const PARTIAL_WRITE: &str = "partial_write";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<FlagError> for ApiError {
    fn from(err: FlagError) -> Self {
        match &err {
            FlagError::InvalidFlag(_) => {
                Self::new(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, err.to_string())
            }
            FlagError::Unavailable { .. } => {
                warn!("request failed, tier unavailable: {}", err);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    codes::UNAVAILABLE,
                    err.to_string(),
                )
            }
            FlagError::OperationFailed { .. } => {
                error!("request failed: {}", err);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::OPERATION_FAILED,
                    err.to_string(),
                )
            }
            FlagError::PartialWrite { .. } => {
                error!("request partially applied: {}", err);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::PARTIAL_WRITE,
                    err.to_string(),
                )
            }
            FlagError::Serialization(_)
            | FlagError::Configuration(_)
            | FlagError::IoError(_) => {
                error!("internal error: {}", err);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::INTERNAL,
                    err.to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
