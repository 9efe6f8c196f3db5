use thiserror::Error;

/// Failure talking to the marketplace REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Forbidden: Invalid or missing authentication token")]
    Forbidden,
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Errors surfaced inline next to the control that triggered them.
///
/// Search box: `SelfMessage`, `UserNotFound`, `Lookup`.
/// Transcript region: `Load`. Composer: `Send`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagingError {
    #[error("You cannot message yourself")]
    SelfMessage,
    #[error("User \"{0}\" does not exist")]
    UserNotFound(String),
    #[error("{0}")]
    Lookup(String),
    #[error("{0}")]
    Load(String),
    #[error("{0}")]
    Send(String),
}

/// Failure reading or writing the stored sign-in.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
