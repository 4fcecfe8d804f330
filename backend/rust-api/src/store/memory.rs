//! In-memory catalog and store used by the test harness and for local
//! development of the embedding API layer.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::answer::AnswerRecord;
use crate::models::streak::StreakState;
use crate::models::{Attempt, Question, QuestionFilter};

use super::{AttemptStore, QuestionCatalog, StoreError};

#[derive(Default)]
pub struct MemoryCatalog {
    questions: Mutex<HashMap<String, Question>>,
    /// Ordered question ids per challenge date.
    daily_sets: Mutex<HashMap<NaiveDate, Vec<String>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_question(&self, question: Question) {
        self.questions
            .lock()
            .unwrap()
            .insert(question.id.clone(), question);
    }

    pub fn add_questions<I: IntoIterator<Item = Question>>(&self, questions: I) {
        let mut map = self.questions.lock().unwrap();
        for question in questions {
            map.insert(question.id.clone(), question);
        }
    }

    /// Registers the fixed question set for a date. Ids must already exist
    /// in the catalog.
    pub fn set_daily_challenge(&self, date: NaiveDate, question_ids: Vec<String>) {
        self.daily_sets.lock().unwrap().insert(date, question_ids);
    }
}

#[async_trait]
impl QuestionCatalog for MemoryCatalog {
    async fn fetch_questions(&self, filter: &QuestionFilter) -> anyhow::Result<Vec<Question>> {
        let questions = self.questions.lock().unwrap();
        Ok(questions
            .values()
            .filter(|q| q.category_id == filter.category_id)
            .filter(|q| filter.difficulty.map_or(true, |d| q.difficulty == d))
            .cloned()
            .collect())
    }

    async fn fetch_daily_challenge_questions(
        &self,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Question>> {
        let daily_sets = self.daily_sets.lock().unwrap();
        let questions = self.questions.lock().unwrap();
        let Some(ids) = daily_sets.get(&date) else {
            return Ok(Vec::new());
        };
        ids.iter()
            .map(|id| {
                questions
                    .get(id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("daily challenge references unknown question {}", id))
            })
            .collect()
    }

    async fn fetch_question(&self, question_id: &str) -> anyhow::Result<Option<Question>> {
        Ok(self.questions.lock().unwrap().get(question_id).cloned())
    }
}

#[derive(Default)]
struct StoreInner {
    attempts: HashMap<String, Attempt>,
    answers: HashMap<String, Vec<AnswerRecord>>,
    streaks: HashMap<String, StreakState>,
}

#[derive(Default)]
pub struct MemoryStore {
    // Single mutex over all tables makes every write transactional.
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/seed helper: installs a streak state directly.
    pub fn put_streak(&self, streak: StreakState) {
        self.inner
            .lock()
            .unwrap()
            .streaks
            .insert(streak.user_id.clone(), streak);
    }
}

fn check_version(
    inner: &StoreInner,
    attempt_id: &str,
    expected_version: u64,
) -> Result<(), StoreError> {
    let stored = inner
        .attempts
        .get(attempt_id)
        .ok_or_else(|| StoreError::AttemptNotFound {
            attempt_id: attempt_id.to_string(),
        })?;
    if stored.version != expected_version {
        return Err(StoreError::VersionConflict {
            attempt_id: attempt_id.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn insert_attempt(&self, attempt: &Attempt) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.attempts.contains_key(&attempt.id) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "attempt {} already exists",
                attempt.id
            )));
        }
        inner.attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(())
    }

    async fn load_attempt(&self, attempt_id: &str) -> Result<Option<Attempt>, StoreError> {
        Ok(self.inner.lock().unwrap().attempts.get(attempt_id).cloned())
    }

    async fn find_daily_attempt(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Attempt>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attempts
            .values()
            .filter(|a| a.user_id == user_id && a.challenge_date == Some(date))
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    async fn record_answer(
        &self,
        attempt: &Attempt,
        record: &AnswerRecord,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        check_version(&inner, &attempt.id, expected_version)?;

        let mut updated = attempt.clone();
        updated.version = expected_version + 1;
        inner.attempts.insert(updated.id.clone(), updated);
        inner
            .answers
            .entry(record.attempt_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn update_attempt(
        &self,
        attempt: &Attempt,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        check_version(&inner, &attempt.id, expected_version)?;

        let mut updated = attempt.clone();
        updated.version = expected_version + 1;
        inner.attempts.insert(updated.id.clone(), updated);
        Ok(())
    }

    async fn complete_daily_attempt(
        &self,
        attempt: &Attempt,
        records: &[AnswerRecord],
        streak: &StreakState,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        check_version(&inner, &attempt.id, expected_version)?;

        let mut updated = attempt.clone();
        updated.version = expected_version + 1;
        inner.attempts.insert(updated.id.clone(), updated);
        inner
            .answers
            .insert(attempt.id.clone(), records.to_vec());
        inner
            .streaks
            .insert(streak.user_id.clone(), streak.clone());
        Ok(())
    }

    async fn load_streak(&self, user_id: &str) -> Result<Option<StreakState>, StoreError> {
        Ok(self.inner.lock().unwrap().streaks.get(user_id).cloned())
    }

    async fn list_answers(&self, attempt_id: &str) -> Result<Vec<AnswerRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .answers
            .get(attempt_id)
            .cloned()
            .unwrap_or_default())
    }
}
