use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session is missing or expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Map a non-success status to an error. The body is kept verbatim so
    /// callers can show server validation messages as-is.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = body.to_string();
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(body),
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimited,
            code @ 500..=599 => ApiError::ServerError { status: code, body },
            code => ApiError::Rejected { status: code, body },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::NetworkError(err.to_string())
    }
}
