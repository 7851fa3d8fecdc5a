use thiserror::Error;

/// Error taxonomy for the client. Validation errors are raised locally
/// before any network round-trip; the remaining variants are normalized at
/// the API client boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("nothing to analyze: provide text or attach a file")]
    EmptyInput,

    #[error("text is too short: minimum {min} characters")]
    TooShort { min: usize },

    #[error("file too large: {size} bytes (maximum {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("analysis result has no id; only persisted results can be exported")]
    MissingResultId,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unauthorized: credentials cleared")]
    Unauthorized,

    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(err)
        }
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(err.to_string())
    }
}
