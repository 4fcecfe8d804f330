use thiserror::Error;
use validator::ValidationErrors;

use crate::models::AttemptStatus;

/// Coarse error taxonomy presented to the API layer. Every [`EngineError`]
/// maps onto exactly one kind so the caller can pick a transport status
/// without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    StateConflict,
    NotEnoughQuestions,
    Internal,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {}", .violations.join("; "))]
    InvalidInput { violations: Vec<String> },

    #[error("attempt {attempt_id} not found")]
    AttemptNotFound { attempt_id: String },

    #[error("question {question_id} not found")]
    QuestionNotFound { question_id: String },

    #[error("no daily challenge defined for {date}")]
    ChallengeNotFound { date: String },

    #[error("attempt {attempt_id} is not active (status: {status:?})")]
    AttemptNotActive {
        attempt_id: String,
        status: AttemptStatus,
    },

    #[error("question {submitted} is not the current question (expected {expected})")]
    QuestionMismatch { expected: String, submitted: String },

    #[error("daily challenge for {date} already completed by user {user_id}")]
    AlreadyCompleted { user_id: String, date: String },

    #[error("invalid answer set: {reason}")]
    InvalidAnswerSet { reason: String },

    #[error("not enough questions: requested {requested}, catalog has {available}")]
    NotEnoughQuestions { requested: u32, available: u32 },

    #[error("attempt {attempt_id} was modified concurrently")]
    VersionConflict { attempt_id: String },

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidInput { .. } | EngineError::InvalidAnswerSet { .. } => {
                ErrorKind::InvalidInput
            }
            EngineError::AttemptNotFound { .. }
            | EngineError::QuestionNotFound { .. }
            | EngineError::ChallengeNotFound { .. } => ErrorKind::NotFound,
            EngineError::AttemptNotActive { .. }
            | EngineError::QuestionMismatch { .. }
            | EngineError::AlreadyCompleted { .. }
            | EngineError::VersionConflict { .. } => ErrorKind::StateConflict,
            EngineError::NotEnoughQuestions { .. } => ErrorKind::NotEnoughQuestions,
            EngineError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Flattens `validator` output into a single failure enumerating every
    /// violated constraint.
    pub fn from_validation(errors: ValidationErrors) -> Self {
        let mut violations = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let detail = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                violations.push(format!("{}: {}", field, detail));
            }
        }
        violations.sort();
        EngineError::InvalidInput { violations }
    }

    pub fn invalid<S: Into<String>>(violation: S) -> Self {
        EngineError::InvalidInput {
            violations: vec![violation.into()],
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
