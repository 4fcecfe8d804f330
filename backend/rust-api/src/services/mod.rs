use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::Config;
use crate::store::{AttemptStore, QuestionCatalog};

pub mod challenge_service;
pub mod quiz_service;
pub mod streak;

pub use challenge_service::ChallengeService;
pub use quiz_service::QuizService;

/// Shared engine state handed to the embedding API layer: configuration plus
/// the constructor-injected catalog and store collaborators.
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn QuestionCatalog>,
    pub store: Arc<dyn AttemptStore>,
    pub locks: Arc<LockRegistry>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn QuestionCatalog>,
        store: Arc<dyn AttemptStore>,
    ) -> Self {
        Self {
            config,
            catalog,
            store,
            locks: Arc::new(LockRegistry::default()),
        }
    }

    pub fn quiz_service(&self) -> QuizService {
        QuizService::new(
            self.catalog.clone(),
            self.store.clone(),
            self.config.scoring.clone(),
            self.locks.clone(),
        )
    }

    pub fn challenge_service(&self) -> ChallengeService {
        ChallengeService::new(
            self.catalog.clone(),
            self.store.clone(),
            self.config.scoring.clone(),
            self.locks.clone(),
        )
    }
}

/// Per-key async mutexes serializing mutations: one key per attempt id, plus
/// `daily:{user}:{date}` keys guarding daily-attempt creation. Entries are
/// small and bounded by the number of attempts seen by this process.
#[derive(Default)]
pub struct LockRegistry {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

pub(crate) fn attempt_lock_key(attempt_id: &str) -> String {
    format!("attempt:{}", attempt_id)
}

pub(crate) fn daily_lock_key(user_id: &str, date: chrono::NaiveDate) -> String {
    format!("daily:{}:{}", user_id, date)
}
