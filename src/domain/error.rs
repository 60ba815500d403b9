use thiserror::Error;

/// Failure of a call against the notes API.
///
/// `Clone` so that a single coalesced request can hand the same failure to
/// every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
