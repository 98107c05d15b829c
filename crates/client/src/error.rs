use thiserror::Error;

use crate::storage::StorageError;
use crate::transport::TransportError;

/// Handled failure of a session operation.
///
/// Every variant renders to a message that can be shown to the user as is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The server said no (bad credentials, unsuccessful envelope, ...).
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(String),

    #[error("failed to persist session: {0}")]
    Storage(String),

    #[error("You are not signed in")]
    NotAuthenticated,

    /// The session changed (logout, another login) while the call was in
    /// flight; its result was discarded.
    #[error("The request was cancelled by a newer sign-in or sign-out")]
    Superseded,
}

impl SessionError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Rejected { message, .. } => SessionError::Rejected(message),
            other => SessionError::Transport(other.to_string()),
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        SessionError::Storage(err.to_string())
    }
}
