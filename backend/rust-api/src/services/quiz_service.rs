use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use uuid::Uuid;
use validator::Validate;

use crate::config::ScoringConfig;
use crate::error::{EngineError, EngineResult};
use crate::metrics::{ANSWERS_SUBMITTED_TOTAL, ATTEMPTS_ACTIVE, ATTEMPTS_TOTAL};
use crate::models::answer::{
    AnswerRecord, StartQuizRequest, StartQuizResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};
use crate::models::{
    Attempt, AttemptKind, AttemptStatus, QuestionFilter, QuestionView,
};
use crate::scoring;
use crate::store::{AttemptStore, QuestionCatalog};

use super::{attempt_lock_key, LockRegistry};

/// Single-player timed quiz engine: question sequencing, strictly in-order
/// answer submission, per-answer scoring with time bonus, completion.
pub struct QuizService {
    catalog: Arc<dyn QuestionCatalog>,
    store: Arc<dyn AttemptStore>,
    scoring: ScoringConfig,
    locks: Arc<LockRegistry>,
}

impl QuizService {
    pub fn new(
        catalog: Arc<dyn QuestionCatalog>,
        store: Arc<dyn AttemptStore>,
        scoring: ScoringConfig,
        locks: Arc<LockRegistry>,
    ) -> Self {
        Self {
            catalog,
            store,
            scoring,
            locks,
        }
    }

    /// Selects and shuffles the question sequence, then creates the attempt.
    /// The order is fixed here for the lifetime of the attempt.
    pub async fn start_quiz(&self, req: StartQuizRequest) -> EngineResult<StartQuizResponse> {
        req.validate().map_err(EngineError::from_validation)?;

        let count = req
            .question_count
            .unwrap_or(self.scoring.default_question_count);
        if count < self.scoring.min_question_count || count > self.scoring.max_question_count {
            return Err(EngineError::invalid(format!(
                "question_count: must be between {} and {}",
                self.scoring.min_question_count, self.scoring.max_question_count
            )));
        }

        let filter = QuestionFilter {
            category_id: req.category_id.clone(),
            difficulty: req.difficulty,
        };
        let mut candidates = self.catalog.fetch_questions(&filter).await?;

        // The catalog makes no uniqueness promise; dedupe by id before
        // checking availability.
        let mut seen = HashSet::new();
        candidates.retain(|q| seen.insert(q.id.clone()));

        if (candidates.len() as u32) < count {
            return Err(EngineError::NotEnoughQuestions {
                requested: count,
                available: candidates.len() as u32,
            });
        }

        let mut rng = rand::rng();
        candidates.shuffle(&mut rng);
        candidates.truncate(count as usize);

        let question_ids = candidates.iter().map(|q| q.id.clone()).collect();
        let attempt = Attempt::new_quiz(&req.user_id, question_ids);
        self.store.insert_attempt(&attempt).await?;

        ATTEMPTS_TOTAL.with_label_values(&["quiz", "created"]).inc();
        ATTEMPTS_ACTIVE.inc();

        tracing::info!(
            "Quiz attempt created: {} for user {} ({} questions, category {})",
            attempt.id,
            req.user_id,
            attempt.total_questions(),
            req.category_id
        );

        Ok(StartQuizResponse {
            attempt_id: attempt.id.clone(),
            total_questions: attempt.total_questions(),
            first_question: QuestionView::from_question(&candidates[0], 0),
            created_at: attempt.created_at,
        })
    }

    /// Scores one answer and advances the attempt. Serialized per attempt
    /// id; answers must target the question at `current_index`, so skipping
    /// and re-answering are both rejected as sequence mismatches.
    pub async fn submit_answer(
        &self,
        attempt_id: &str,
        req: SubmitAnswerRequest,
    ) -> EngineResult<SubmitAnswerResponse> {
        req.validate().map_err(EngineError::from_validation)?;

        let _guard = self.locks.acquire(&attempt_lock_key(attempt_id)).await;

        let attempt = self
            .store
            .load_attempt(attempt_id)
            .await?
            .ok_or_else(|| EngineError::AttemptNotFound {
                attempt_id: attempt_id.to_string(),
            })?;

        if attempt.kind != AttemptKind::Quiz {
            return Err(EngineError::invalid(
                "attempt: daily challenge attempts are completed as a batch",
            ));
        }
        if attempt.status != AttemptStatus::Active {
            return Err(EngineError::AttemptNotActive {
                attempt_id: attempt_id.to_string(),
                status: attempt.status,
            });
        }

        let expected = match attempt.current_question_id() {
            Some(id) => id.to_string(),
            // Active implies current_index < len; treat a violated invariant
            // as a non-active attempt rather than panicking.
            None => {
                return Err(EngineError::AttemptNotActive {
                    attempt_id: attempt_id.to_string(),
                    status: attempt.status,
                })
            }
        };
        if expected != req.question_id {
            return Err(EngineError::QuestionMismatch {
                expected,
                submitted: req.question_id,
            });
        }

        let question = self
            .catalog
            .fetch_question(&req.question_id)
            .await?
            .ok_or_else(|| EngineError::QuestionNotFound {
                question_id: req.question_id.clone(),
            })?;

        let result = scoring::score(
            &question,
            &req.selected_answer,
            req.time_spent_seconds,
            self.scoring.max_time_bonus_rate,
        )?;

        let record = AnswerRecord {
            id: Uuid::new_v4().to_string(),
            attempt_id: attempt.id.clone(),
            question_id: question.id.clone(),
            selected_answer: req.selected_answer,
            time_spent_seconds: req.time_spent_seconds,
            is_correct: result.is_correct,
            points_earned: result.points_earned,
            order_index: attempt.current_index,
            submitted_at: Utc::now(),
        };

        let mut updated = attempt.clone();
        updated.current_index += 1;
        updated.score += result.points_earned;
        if result.is_correct {
            updated.correct_count += 1;
        }
        let is_last_question = updated.current_index == updated.total_questions();
        if is_last_question {
            updated.status = AttemptStatus::Completed;
            updated.completed_at = Some(Utc::now());
        }

        // Record + counters + possible completion land in one versioned
        // write; a concurrent writer surfaces as a state conflict.
        self.store
            .record_answer(&updated, &record, attempt.version)
            .await?;

        ANSWERS_SUBMITTED_TOTAL
            .with_label_values(&[if result.is_correct { "true" } else { "false" }])
            .inc();
        if is_last_question {
            ATTEMPTS_TOTAL
                .with_label_values(&["quiz", "completed"])
                .inc();
            ATTEMPTS_ACTIVE.dec();
        }

        tracing::info!(
            "Answer processed: attempt={}, question={}, correct={}, points={}, index={}/{}",
            attempt.id,
            question.id,
            result.is_correct,
            result.points_earned,
            updated.current_index,
            updated.total_questions()
        );

        let next_question = if is_last_question {
            None
        } else {
            self.next_question_view(&updated).await
        };

        Ok(SubmitAnswerResponse {
            is_correct: result.is_correct,
            correct_answer: question.correct_answer,
            explanation: question.explanation,
            points_earned: result.points_earned,
            base_points: result.base_points,
            time_bonus: result.time_bonus_fraction,
            total_score: updated.score,
            correct_answers_count: updated.correct_count,
            current_index: updated.current_index,
            is_last_question,
            next_question,
        })
    }

    /// Terminates an active attempt. Idempotent: already-terminal attempts
    /// are returned unchanged.
    pub async fn abandon(&self, attempt_id: &str) -> EngineResult<Attempt> {
        let _guard = self.locks.acquire(&attempt_lock_key(attempt_id)).await;

        let attempt = self
            .store
            .load_attempt(attempt_id)
            .await?
            .ok_or_else(|| EngineError::AttemptNotFound {
                attempt_id: attempt_id.to_string(),
            })?;

        if attempt.kind != AttemptKind::Quiz {
            return Err(EngineError::invalid(
                "attempt: daily challenge attempts cannot be abandoned",
            ));
        }
        if attempt.is_terminal() {
            return Ok(attempt);
        }

        let mut updated = attempt.clone();
        updated.status = AttemptStatus::Abandoned;
        updated.completed_at = Some(Utc::now());
        self.store.update_attempt(&updated, attempt.version).await?;
        updated.version = attempt.version + 1;

        ATTEMPTS_TOTAL
            .with_label_values(&["quiz", "abandoned"])
            .inc();
        ATTEMPTS_ACTIVE.dec();

        tracing::info!("Quiz attempt abandoned: {}", attempt_id);

        Ok(updated)
    }

    /// The answer is already persisted at this point; a catalog hiccup on
    /// the lookahead must not fail the submission.
    async fn next_question_view(&self, attempt: &Attempt) -> Option<QuestionView> {
        let question_id = attempt.current_question_id()?;
        match self.catalog.fetch_question(question_id).await {
            Ok(Some(question)) => Some(QuestionView::from_question(
                &question,
                attempt.current_index,
            )),
            Ok(None) => {
                tracing::warn!(
                    "Attempt {} references unknown question {}",
                    attempt.id,
                    question_id
                );
                None
            }
            Err(e) => {
                tracing::warn!("Failed to fetch next question for {}: {}", attempt.id, e);
                None
            }
        }
    }
}
