use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::QuestionView;

#[derive(Debug, Deserialize, Validate)]
pub struct StartChallengeRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub user_id: String,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct StartChallengeResponse {
    pub attempt_id: String,
    pub date: NaiveDate,
    pub total_questions: usize,
    pub questions: Vec<QuestionView>,
    /// True when an in-progress attempt already existed for this user/date
    /// and was returned instead of a fresh one.
    pub resumed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteChallengeRequest {
    #[validate(length(min = 1, message = "must contain at least one answer"))]
    pub answers: Vec<AnswerSubmission>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AnswerSubmission {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub question_id: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub selected_answer: String,
    #[validate(range(min = 0.0, message = "must be >= 0"))]
    pub time_spent_seconds: f64,
}

/// Full result of a completed daily challenge. `base_points` already
/// includes per-answer time bonuses; the streak bonus multiplies that total.
#[derive(Debug, Serialize)]
pub struct ChallengeResult {
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: usize,
    pub base_points: u32,
    pub streak_multiplier: f64,
    pub streak_bonus: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub answer_results: Vec<AnswerResult>,
    pub is_new_record: bool,
}

#[derive(Debug, Serialize)]
pub struct AnswerResult {
    pub question_id: String,
    pub is_correct: bool,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub base_points: u32,
    /// Unused-time fraction in `[0, 1]`; zero for incorrect answers.
    pub time_bonus: f64,
    pub points_earned: u32,
}
