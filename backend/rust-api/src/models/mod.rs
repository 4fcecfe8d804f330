use serde::{Deserialize, Serialize};

pub mod answer;
pub mod attempt;
pub mod daily;
pub mod streak;

pub use attempt::{Attempt, AttemptKind, AttemptStatus};

/// Immutable content item owned by the question catalog. Read-only to the
/// engines; `correct_answer` holds the canonical (already normalized) value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category_id: String,
    pub difficulty: Difficulty,
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub base_points: u32,
    pub time_limit_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultiChoice,
    TrueFalse,
}

/// Catalog query for quiz-session question selection.
#[derive(Debug, Clone)]
pub struct QuestionFilter {
    pub category_id: String,
    pub difficulty: Option<Difficulty>,
}

/// Player-facing projection of a question: everything except the correct
/// answer and explanation.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<String>,
    pub base_points: u32,
    pub time_limit_seconds: u32,
    /// Position of this question inside the attempt's fixed sequence.
    pub index: usize,
}

impl QuestionView {
    pub fn from_question(question: &Question, index: usize) -> Self {
        QuestionView {
            id: question.id.clone(),
            kind: question.kind,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            base_points: question.base_points,
            time_limit_seconds: question.time_limit_seconds,
            index,
        }
    }
}
