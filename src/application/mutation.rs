use crate::domain::TransportError;

/// Status of the last run of a mutation (create or delete).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Success,
    Error(TransportError),
}

impl MutationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MutationState::Success)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MutationState::Error(_))
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            MutationState::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Record the outcome of a finished run.
    pub fn finish<T>(&mut self, result: &Result<T, TransportError>) {
        *self = match result {
            Ok(_) => MutationState::Success,
            Err(e) => MutationState::Error(e.clone()),
        };
    }
}
