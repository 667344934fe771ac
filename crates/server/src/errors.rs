use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

pub const READ_FAILED: &str = "Failed to read data";
pub const SAVE_FAILED: &str = "Failed to save data";

/// Request-boundary error; always rendered as `{"error": <message>}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Storage detail is logged, only the fixed message reaches the client.
    Internal(&'static str),
}

impl ApiError {
    pub fn from_service(err: ServiceError, internal_msg: &'static str) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::BadRequest(msg),
            ServiceError::Storage(detail) => {
                error!(error = %detail, "API Error: {internal_msg}");
                Self::Internal(internal_msg)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg) => msg.as_str(),
            Self::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({"error": self.message()}))).into_response()
    }
}
