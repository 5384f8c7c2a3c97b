/// Unified error types for the Voz archiver.
use thiserror::Error;

/// Top-level error type for the archiver processes.
#[derive(Debug, Error)]
pub enum VozError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while resolving or downloading a single programme.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid date {0:?}: expected DDMMYYYY (e.g. 06112024)")]
    InvalidDate(String),

    #[error("Invalid base filename {0:?}")]
    InvalidFilename(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Whether the archive has no file for the date yet (HTTP 404).
    pub fn is_not_published(&self) -> bool {
        matches!(self, FetchError::HttpStatus { status: 404, .. })
    }

    /// Process exit code the downloader reports for this error.
    ///
    /// Argument problems use 2 (the same code clap uses for usage errors),
    /// everything that happens after validation uses 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            FetchError::InvalidDate(_) | FetchError::InvalidFilename(_) => 2,
            _ => 1,
        }
    }
}

/// Errors from running the downloader as a child process.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to spawn downloader: {0}")]
    SpawnFailed(String),

    #[error("Downloader exited with {}: {stderr}", describe_code(.code))]
    FetcherFailed { code: Option<i32>, stderr: String },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {}", c),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type alias for archiver operations.
pub type VozResult<T> = Result<T, VozError>;
