use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One play-through of a quiz or daily challenge.
///
/// The question sequence is fixed at creation and never reordered;
/// `current_index` only moves forward and never exceeds the sequence length.
/// Terminal attempts are retained for history and streak computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: String,
    pub user_id: String,
    pub kind: AttemptKind,
    /// Calendar date of the challenge; `None` for plain quiz attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_date: Option<NaiveDate>,
    pub question_ids: Vec<String>,
    pub current_index: usize,
    pub score: u32,
    pub correct_count: u32,
    pub status: AttemptStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency counter, incremented by the store on every
    /// successful write.
    pub version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptKind {
    Quiz,
    DailyChallenge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Active,
    Completed,
    Abandoned,
}

impl Attempt {
    pub fn new_quiz(user_id: &str, question_ids: Vec<String>) -> Self {
        Self::new(user_id, AttemptKind::Quiz, None, question_ids)
    }

    pub fn new_daily(user_id: &str, date: NaiveDate, question_ids: Vec<String>) -> Self {
        Self::new(user_id, AttemptKind::DailyChallenge, Some(date), question_ids)
    }

    fn new(
        user_id: &str,
        kind: AttemptKind,
        challenge_date: Option<NaiveDate>,
        question_ids: Vec<String>,
    ) -> Self {
        Attempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            challenge_date,
            question_ids,
            current_index: 0,
            score: 0,
            correct_count: 0,
            status: AttemptStatus::Active,
            created_at: Utc::now(),
            completed_at: None,
            version: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            AttemptStatus::Completed | AttemptStatus::Abandoned
        )
    }

    pub fn total_questions(&self) -> usize {
        self.question_ids.len()
    }

    /// Question awaiting an answer, `None` once the sequence is exhausted.
    pub fn current_question_id(&self) -> Option<&str> {
        self.question_ids.get(self.current_index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_attempt_starts_active_at_index_zero() {
        let attempt = Attempt::new_quiz("user-1", vec!["q1".into(), "q2".into()]);
        assert_eq!(attempt.status, AttemptStatus::Active);
        assert_eq!(attempt.current_index, 0);
        assert_eq!(attempt.current_question_id(), Some("q1"));
        assert!(attempt.completed_at.is_none());
        assert!(!attempt.is_terminal());
    }

    #[test]
    fn current_question_is_none_past_the_sequence() {
        let mut attempt = Attempt::new_quiz("user-1", vec!["q1".into()]);
        attempt.current_index = 1;
        assert_eq!(attempt.current_question_id(), None);
    }

    #[test]
    fn daily_attempt_carries_challenge_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let attempt = Attempt::new_daily("user-1", date, vec!["q1".into()]);
        assert_eq!(attempt.kind, AttemptKind::DailyChallenge);
        assert_eq!(attempt.challenge_date, Some(date));
    }
}
