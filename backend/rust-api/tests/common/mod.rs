#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use quizcore_api::config::{Config, ScoringConfig};
use quizcore_api::models::{Difficulty, Question, QuestionKind};
use quizcore_api::services::AppState;
use quizcore_api::store::{MemoryCatalog, MemoryStore};

pub struct TestContext {
    pub state: AppState,
    pub catalog: Arc<MemoryCatalog>,
    pub store: Arc<MemoryStore>,
}

pub fn create_test_state() -> TestContext {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let catalog = Arc::new(MemoryCatalog::new());
    let store = Arc::new(MemoryStore::new());
    let config = Config {
        scoring: ScoringConfig::default(),
    };
    let state = AppState::new(config, catalog.clone(), store.clone());

    TestContext {
        state,
        catalog,
        store,
    }
}

/// Question answered by "answer-{id}", worth 10 points in 30 seconds.
pub fn question(id: &str, category_id: &str) -> Question {
    Question {
        id: id.to_string(),
        category_id: category_id.to_string(),
        difficulty: Difficulty::Easy,
        kind: QuestionKind::SingleChoice,
        prompt: format!("Prompt for {}", id),
        options: vec![correct_answer(id), "wrong".to_string()],
        correct_answer: correct_answer(id),
        base_points: 10,
        time_limit_seconds: 30,
        explanation: Some(format!("Because {}", id)),
    }
}

pub fn correct_answer(question_id: &str) -> String {
    format!("answer-{}", question_id)
}

/// Seeds `count` questions in a category and returns their ids.
pub fn seed_category(catalog: &MemoryCatalog, category_id: &str, count: usize) -> Vec<String> {
    let ids: Vec<String> = (0..count)
        .map(|i| format!("{}-q{}", category_id, i))
        .collect();
    catalog.add_questions(ids.iter().map(|id| question(id, category_id)));
    ids
}

/// Seeds a fixed daily challenge of `count` questions and returns their ids.
pub fn seed_daily_challenge(
    catalog: &MemoryCatalog,
    date: NaiveDate,
    count: usize,
) -> Vec<String> {
    let ids: Vec<String> = (0..count).map(|i| format!("daily-{}-q{}", date, i)).collect();
    catalog.add_questions(ids.iter().map(|id| question(id, "daily")));
    catalog.set_daily_challenge(date, ids.clone());
    ids
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
