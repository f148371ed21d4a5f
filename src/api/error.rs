use reqwest::StatusCode;
use thiserror::Error;

/// Message used when neither the server nor the transport said anything useful
pub const GENERIC_MESSAGE: &str = "API request failed";

/// Every failure of an API call, reduced to a human-readable message
///
/// Values are cloned into UI messages, so they carry strings rather than the
/// underlying `reqwest`/`io` errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Server { status: u16, message: String },
    /// The request never produced a response
    #[error("{0}")]
    Transport(String),
    /// The response body could not be decoded
    #[error("{0}")]
    Decode(String),
    /// Local file I/O around an upload or download failed
    #[error("{0}")]
    Io(String),
}

impl ApiError {
    /// Build an error from a failed response.
    ///
    /// Prefers the server's `message` field, then DRF's `detail`, then the
    /// transport-level status description.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let server_message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "detail"].iter().find_map(|field| {
                    value
                        .get(field)
                        .and_then(|v| v.as_str())
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
            });

        let message = server_message
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    }

    /// The message to show the user, never empty
    pub fn message(&self) -> &str {
        let message = match self {
            ApiError::Server { message, .. } => message.as_str(),
            ApiError::Transport(m) | ApiError::Decode(m) | ApiError::Io(m) => m.as_str(),
        };

        if message.trim().is_empty() {
            GENERIC_MESSAGE
        } else {
            message
        }
    }

    /// HTTP status, when the server answered
    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_server_message() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            br#"{"status": "error", "message": "File size exceeds 10MB limit"}"#,
        );
        assert_eq!(err.message(), "File size exceeds 10MB limit");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_falls_back_to_detail() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, br#"{"detail": "Not found."}"#);
        assert_eq!(err.message(), "Not found.");
    }

    #[test]
    fn test_falls_back_to_status_text() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(err.message(), "Request failed with status code 500");

        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, br#"{"message": "   "}"#);
        assert_eq!(err.message(), "Request failed with status code 502");
    }

    #[test]
    fn test_generic_message_when_empty() {
        assert_eq!(ApiError::Transport(String::new()).message(), GENERIC_MESSAGE);
        assert_eq!(ApiError::Transport("Network Error".into()).message(), "Network Error");
    }

    #[test]
    fn test_io_conversion() {
        let err: ApiError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, ApiError::Io(_)));
        assert_eq!(err.status(), None);
    }
}
