use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("Connection timed out, check network settings")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Server returned no data")]
    EmptyData,

    #[error("Request rejected by server")]
    Rejected,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Builds the error for a non-2xx response carrying the server's message.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        let message = if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            message
        };
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// True when the credentials used for the call are no longer accepted.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// True when the server could not be reached, as opposed to answering.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Timeout | ApiError::Connection(_))
    }

    /// HTTP status code of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED.as_u16()),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status, String::new())
        } else {
            ApiError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
