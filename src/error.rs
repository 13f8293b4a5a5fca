#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Empty dataset from {0}")]
    EmptyDataset(&'static str),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Failure to obtain a successful HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("HTTP {code}: {text}")]
    Status { code: u16, text: String },

    #[error("Request failed: {0}")]
    Transport(String),
}

impl MonitorError {
    /// HTTP status code carried by the error, if the server answered at all.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Network(NetworkError::Status { code, .. }) => Some(*code),
            _ => None,
        }
    }
}

pub type MonitorResult<T> = Result<T, MonitorError>;
