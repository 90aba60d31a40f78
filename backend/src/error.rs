use std::fmt;
use thiserror::Error;

/// What went wrong while talking to the YouTube Data API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    Transport,
    /// The API answered with a non-success HTTP status.
    HttpStatus(u16),
    /// The API answered 2xx but the payload carried an `error` object.
    Api,
    /// The body could not be read as JSON.
    MalformedResponse,
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamErrorKind::Transport => write!(f, "transport"),
            UpstreamErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            UpstreamErrorKind::Api => write!(f, "api error"),
            UpstreamErrorKind::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("YouTube API request failed ({kind}): {message}")]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub message: String,
}

impl UpstreamError {
    pub fn new(kind: UpstreamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Archive entry not found: {0}")]
    NotFound(String),

    #[error("Archive entry {filename} is not valid JSON: {source}")]
    CorruptData {
        filename: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid archive filename: {0:?}")]
    InvalidFilename(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: String, value: String },
}
