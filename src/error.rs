use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad credentials. User-visible, not retryable without new input.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// No active session (or a session with no roles).
    #[error("Not authenticated")]
    Unauthenticated,

    /// The session is authenticated but lacks a required role.
    #[error("Authorization failed")]
    Forbidden,

    /// The request already reached a terminal state; the UI is stale.
    #[error("Request already finalized")]
    AlreadyFinalized,

    /// A reject decision was submitted without a comment.
    #[error("A comment is required when rejecting a request")]
    MissingComment,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A structurally invalid list query (zero page or page size).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A network or transport failure talking to the backend.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered with an embedded failure status; the message
    /// is shown to the user verbatim.
    #[error("{0}")]
    ApplicationRejected(String),

    /// The backend answered with a body this crate could not decode.
    #[error("Decode error: {0}")]
    Decode(String),

    /// An internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Whether retrying the same call may succeed without user input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::BackendUnavailable(_))
    }

    /// Whether the error is resolved locally, without any network call.
    pub fn is_local_validation(&self) -> bool {
        matches!(
            self,
            AppError::MissingComment | AppError::Validation(_) | AppError::InvalidQuery(_)
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::Decode(e.to_string())
        } else {
            AppError::BackendUnavailable(e.to_string())
        }
    }
}
