use thiserror::Error;

/// Errors surfaced by the list layer.
///
/// `Clone` because one in-flight fetch hands the same result to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl ListError {
    /// Text that is safe to show to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Server { status, .. } if *status == 401 || *status == 403 => {
                "You are not allowed to view this list.".to_string()
            }
            Self::Server { status, .. } => {
                format!("The server could not load this list (status {}).", status)
            }
            Self::Decode(_) => "The server sent a response we could not read.".to_string(),
            Self::Config(_) | Self::InvalidRequest(_) | Self::Lock(_) => {
                "Something went wrong while loading this list.".to_string()
            }
        }
    }

    /// Transport and server failures are the ones a caller may choose to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server { .. })
    }
}

pub type Result<T> = std::result::Result<T, ListError>;

impl<T> From<std::sync::PoisonError<T>> for ListError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

impl From<serde_json::Error> for ListError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
