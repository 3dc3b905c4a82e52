use lambda_http::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

pub const METHOD_NOT_ALLOWED_ERROR: &str = "Method not allowed";
pub const MISSING_API_KEY_ERROR: &str = "API key not configured";
pub const TIMEOUT_ERROR: &str = "Video generation timeout";

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}", METHOD_NOT_ALLOWED_ERROR)]
    MethodNotAllowed,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{}", MISSING_API_KEY_ERROR)]
    MissingApiKey,
    #[error("API Error: {}", .0.as_u16())]
    Submission(StatusCode),
    #[error("Status check failed: {}", .0.as_u16())]
    StatusCheck(StatusCode),
    #[error("{}", TIMEOUT_ERROR)]
    Timeout,
    #[error("Provider response did not contain a video URL")]
    MissingVideoUrl,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Response(#[from] lambda_http::http::Error),
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::InvalidRequest(format!("Invalid image data: {}", err))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}
