use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration errors. All of these are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("secrets file not found: {}", .0.display())]
    SecretsMissing(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no openai_api_key in {}", .0.display())]
    MissingApiKey(PathBuf),

    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Everything that can go wrong during a single call to the completion service.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("authentication failed ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("rate limit or quota exceeded: {body}")]
    RateLimited { body: String },

    #[error("completion API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("completion service returned no content")]
    EmptyResponse,

    #[error("no reply within {0}s")]
    Deadline(u64),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout(err)
        } else if err.is_decode() {
            CompletionError::MalformedResponse(err.to_string())
        } else {
            CompletionError::Network(err)
        }
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::MalformedResponse(err.to_string())
    }
}

impl CompletionError {
    /// Maps a non-success HTTP status and its body onto the taxonomy.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => CompletionError::Unauthorized { status, body },
            429 => CompletionError::RateLimited { body },
            _ => CompletionError::Api { status, body },
        }
    }
}

pub type CompletionResult<T> = Result<T, CompletionError>;
