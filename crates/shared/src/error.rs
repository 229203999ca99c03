use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    StoreUnavailable,
    RenderFailure,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failures of the frame cycle. Everything the handler can surface to a
/// client maps onto one of these three kinds.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("state store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("frame render failed: {0}")]
    RenderFailure(String),
    #[error("a frame allows at most four buttons, got {0}")]
    TooManyButtons(usize),
}

impl From<FrameError> for ApiError {
    fn from(value: FrameError) -> Self {
        let code = match value {
            FrameError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
            FrameError::RenderFailure(_) => ErrorCode::RenderFailure,
            FrameError::TooManyButtons(_) => ErrorCode::Validation,
        };
        ApiError::new(code, value.to_string())
    }
}
