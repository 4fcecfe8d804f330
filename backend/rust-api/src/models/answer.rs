use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Difficulty, QuestionView};

/// Persisted record of one submitted answer. Created exactly once per
/// question per attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: String,
    pub attempt_id: String,
    pub question_id: String,
    pub selected_answer: String,
    pub time_spent_seconds: f64,
    pub is_correct: bool,
    pub points_earned: u32,
    /// Submission order; equals the question's position in the attempt.
    pub order_index: usize,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StartQuizRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category_id: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Defaults to the configured count when absent; bounds are enforced
    /// against the configured min/max in the service.
    #[serde(default)]
    pub question_count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct StartQuizResponse {
    pub attempt_id: String,
    pub total_questions: usize,
    pub first_question: QuestionView,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub question_id: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub selected_answer: String,
    #[validate(range(min = 0.0, message = "must be >= 0"))]
    pub time_spent_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub points_earned: u32,
    pub base_points: u32,
    /// Unused-time fraction in `[0, 1]`; zero for incorrect answers.
    pub time_bonus: f64,
    pub total_score: u32,
    pub correct_answers_count: u32,
    pub current_index: usize,
    pub is_last_question: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<QuestionView>,
}
