use tnd_ledger::{CommitError, GatewayError};
use tnd_schemas::ValidationError;

/// Stable failure categories. Callers branch on these, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidInput,
    InvalidState,
    WindowViolation,
    DependencyFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::InvalidState => "INVALID_STATE",
            ErrorKind::WindowViolation => "WINDOW_VIOLATION",
            ErrorKind::DependencyFailure => "DEPENDENCY_FAILURE",
        }
    }
}

/// Terminal failure of a transaction. Any `Err` aborts every write and event
/// the handler staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    NotFound(String),
    AlreadyExists(String),
    InvalidInput(String),
    InvalidState(String),
    WindowViolation(String),
    DependencyFailure(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            EngineError::InvalidInput(_) => ErrorKind::InvalidInput,
            EngineError::InvalidState(_) => ErrorKind::InvalidState,
            EngineError::WindowViolation(_) => ErrorKind::WindowViolation,
            EngineError::DependencyFailure(_) => ErrorKind::DependencyFailure,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            EngineError::NotFound(d)
            | EngineError::AlreadyExists(d)
            | EngineError::InvalidInput(d)
            | EngineError::InvalidState(d)
            | EngineError::WindowViolation(d)
            | EngineError::DependencyFailure(d) => d,
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind().as_str(), self.detail())
    }
}

impl std::error::Error for EngineError {}

impl From<GatewayError> for EngineError {
    fn from(e: GatewayError) -> Self {
        EngineError::DependencyFailure(e.to_string())
    }
}

impl From<CommitError> for EngineError {
    fn from(e: CommitError) -> Self {
        EngineError::DependencyFailure(e.to_string())
    }
}

impl From<ValidationError> for EngineError {
    fn from(e: ValidationError) -> Self {
        EngineError::InvalidInput(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_leads_with_the_kind() {
        let e = EngineError::WindowViolation("bid window closed at 2025-01-01T00:00:00Z".into());
        assert_eq!(
            e.to_string(),
            "WINDOW_VIOLATION: bid window closed at 2025-01-01T00:00:00Z"
        );
    }

    #[test]
    fn collaborator_failures_are_dependency_failures() {
        let denied: EngineError = GatewayError::AccessDenied {
            collection: "bidsCollection".into(),
        }
        .into();
        assert_eq!(denied.kind(), ErrorKind::DependencyFailure);

        let conflict: EngineError = CommitError::MvccConflict { key: "K".into() }.into();
        assert_eq!(conflict.kind(), ErrorKind::DependencyFailure);
    }
}
