//! Error types shared across the library.

use std::path::PathBuf;
use thiserror::Error;

/// Library-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Main error type for the resolver.
///
/// Expected per-candidate results (not found, no public profile, transient
/// failures) are not errors; they are carried by `ProbeOutcome`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Error reading CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Malformed name '{0}': no usable tokens")]
    MalformedName(String),

    #[error("Account {0} does not expose a public profile")]
    NoPublicProfile(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Operation cancelled by user")]
    Interrupted,
}

impl AppError {
    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::InputNotFound(_)
                | AppError::MalformedInput(_)
                | AppError::Csv(_)
                | AppError::Authentication(_)
                | AppError::Interrupted
        )
    }

    /// Process exit code reported by the CLI for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InputNotFound(_) => 2,
            AppError::MalformedInput(_) | AppError::Csv(_) => 3,
            AppError::Authentication(_) => 4,
            AppError::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Failure to obtain a usable session. Always fatal for a batch run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("no stored session found at '{}'; log in first to create one", .0.display())]
    MissingCredentials(PathBuf),

    #[error("stored session was rejected: {0}")]
    Rejected(String),

    #[error("authentication service unavailable: {0}")]
    Unavailable(String),

    #[error("session manager was already shut down")]
    SessionClosed,
}

/// Failure reported by a remote collaborator for a single call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("session expired or was closed by the remote side")]
    SessionExpired,

    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl ServiceError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ServiceError::SessionExpired)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else if e.is_decode() {
            ServiceError::Protocol(e.to_string())
        } else if let Some(status) = e.status() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                ServiceError::SessionExpired
            } else {
                ServiceError::Status(status.as_u16())
            }
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}
