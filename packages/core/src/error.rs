use std::error::Error;
use std::fmt;

/// Unified application error for the binary.
///
/// Covers startup (config, HTTP client construction) and the terminal
/// loop. Failures inside the fetch-render pipeline never surface here;
/// they are rendered into the dashboard slots instead.
#[derive(Debug)]
pub enum AppError {
    Config(String),
    Client(String),
    Io(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Client(msg) => write!(f, "Client error: {}", msg),
            AppError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for AppError {}

/// Failure of a single API request.
///
/// `Transport`, `Network` and `Timeout` are transport-level failures;
/// `Api` means the server answered with `success: false`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("HTTP error: status {status}")]
    Transport { status: u16 },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("API Error: {message}")]
    Api { message: String },

    #[error("Malformed response: {message}")]
    Parse { message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::Api { message: message.into() }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_carries_server_reason() {
        let err = FetchError::api("DB unavailable");
        assert_eq!(err.to_string(), "API Error: DB unavailable");
    }

    #[test]
    fn timeout_and_status_messages() {
        assert_eq!(
            FetchError::Timeout { seconds: 30 }.to_string(),
            "Request timed out after 30s"
        );
        assert_eq!(
            FetchError::Transport { status: 503 }.to_string(),
            "HTTP error: status 503"
        );
    }
}
