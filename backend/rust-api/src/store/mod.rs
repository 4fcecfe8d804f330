//! Abstract persistence contracts. The engines receive these as
//! constructor-passed trait objects; production wires a real database, the
//! test harness and local development use the in-memory implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::error::EngineError;
use crate::models::answer::AnswerRecord;
use crate::models::streak::StreakState;
use crate::models::{Attempt, Question, QuestionFilter};

pub mod memory;

pub use memory::{MemoryCatalog, MemoryStore};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The attempt was written by someone else since it was loaded.
    #[error("version conflict on attempt {attempt_id}")]
    VersionConflict { attempt_id: String },

    #[error("attempt {attempt_id} not found")]
    AttemptNotFound { attempt_id: String },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { attempt_id } => {
                EngineError::VersionConflict { attempt_id }
            }
            StoreError::AttemptNotFound { attempt_id } => {
                EngineError::AttemptNotFound { attempt_id }
            }
            StoreError::Backend(err) => EngineError::Store(err),
        }
    }
}

/// Read-only question content supplier.
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    /// Candidate questions matching the filter, in no particular order.
    async fn fetch_questions(&self, filter: &QuestionFilter) -> anyhow::Result<Vec<Question>>;

    /// The fixed, ordered question set for a calendar date's challenge.
    /// Empty when no challenge is defined for the date.
    async fn fetch_daily_challenge_questions(
        &self,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Question>>;

    async fn fetch_question(&self, question_id: &str) -> anyhow::Result<Option<Question>>;
}

/// Attempt, answer-record and streak persistence.
///
/// Every mutating method is atomic: it either fully applies or fails without
/// persisting anything. Methods taking `expected_version` compare it against
/// the stored attempt and fail with [`StoreError::VersionConflict`] on a
/// stale read; on success the stored version becomes `expected_version + 1`.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn insert_attempt(&self, attempt: &Attempt) -> Result<(), StoreError>;

    async fn load_attempt(&self, attempt_id: &str) -> Result<Option<Attempt>, StoreError>;

    /// Non-completed or completed attempt for the user/date pair, if any.
    async fn find_daily_attempt(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Attempt>, StoreError>;

    /// Appends one answer record and persists the updated attempt in a
    /// single transaction.
    async fn record_answer(
        &self,
        attempt: &Attempt,
        record: &AnswerRecord,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    /// Versioned write of attempt fields alone (abandon path).
    async fn update_attempt(
        &self,
        attempt: &Attempt,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    /// Persists the completed attempt, the full batch of answer records and
    /// the updated streak state in a single transaction. This is the
    /// atomicity boundary that keeps streak updates consistent with the
    /// triggering completion.
    async fn complete_daily_attempt(
        &self,
        attempt: &Attempt,
        records: &[AnswerRecord],
        streak: &StreakState,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    async fn load_streak(&self, user_id: &str) -> Result<Option<StreakState>, StoreError>;

    /// Answer records for an attempt, in submission order.
    async fn list_answers(&self, attempt_id: &str) -> Result<Vec<AnswerRecord>, StoreError>;
}
