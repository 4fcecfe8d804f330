use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::config::ScoringConfig;
use crate::error::{EngineError, EngineResult};
use crate::metrics::{
    ATTEMPTS_ACTIVE, ATTEMPTS_TOTAL, DAILY_CHALLENGES_COMPLETED_TOTAL, STREAK_LENGTH_DAYS,
};
use crate::models::answer::AnswerRecord;
use crate::models::daily::{
    AnswerResult, AnswerSubmission, ChallengeResult, CompleteChallengeRequest,
    StartChallengeRequest, StartChallengeResponse,
};
use crate::models::streak::StreakState;
use crate::models::{Attempt, AttemptKind, AttemptStatus, QuestionView};
use crate::scoring;
use crate::services::streak;
use crate::store::{AttemptStore, QuestionCatalog};

use super::{attempt_lock_key, daily_lock_key, LockRegistry};

/// Daily challenge engine: one attempt per user per calendar day against a
/// fixed question set, completed as a single answer batch, with a streak
/// bonus on top of the shared scoring function.
pub struct ChallengeService {
    catalog: Arc<dyn QuestionCatalog>,
    store: Arc<dyn AttemptStore>,
    scoring: ScoringConfig,
    locks: Arc<LockRegistry>,
}

impl ChallengeService {
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

    /// Starts (or resumes) the user's attempt for `date`. Idempotent: an
    /// in-progress attempt is returned as-is; a completed one is a
    /// state conflict. The per-user/date lock makes the at-most-one
    /// invariant hold under concurrent calls.
    pub async fn start_attempt(
        &self,
        req: StartChallengeRequest,
    ) -> EngineResult<StartChallengeResponse> {
        req.validate().map_err(EngineError::from_validation)?;

        let _guard = self
            .locks
            .acquire(&daily_lock_key(&req.user_id, req.date))
            .await;

        if let Some(existing) = self.store.find_daily_attempt(&req.user_id, req.date).await? {
            if existing.status == AttemptStatus::Completed {
                return Err(EngineError::AlreadyCompleted {
                    user_id: req.user_id,
                    date: req.date.to_string(),
                });
            }
            tracing::info!(
                "Resuming daily attempt {} for user {} on {}",
                existing.id,
                req.user_id,
                req.date
            );
            let questions = self.question_views(&existing).await?;
            return Ok(StartChallengeResponse {
                attempt_id: existing.id.clone(),
                date: req.date,
                total_questions: existing.total_questions(),
                questions,
                resumed: true,
                created_at: existing.created_at,
            });
        }

        let challenge_questions = self
            .catalog
            .fetch_daily_challenge_questions(req.date)
            .await?;
        if challenge_questions.is_empty() {
            return Err(EngineError::ChallengeNotFound {
                date: req.date.to_string(),
            });
        }

        let question_ids = challenge_questions.iter().map(|q| q.id.clone()).collect();
        let attempt = Attempt::new_daily(&req.user_id, req.date, question_ids);
        self.store.insert_attempt(&attempt).await?;

        ATTEMPTS_TOTAL
            .with_label_values(&["daily_challenge", "created"])
            .inc();
        ATTEMPTS_ACTIVE.inc();

        tracing::info!(
            "Daily attempt created: {} for user {} on {} ({} questions)",
            attempt.id,
            req.user_id,
            req.date,
            attempt.total_questions()
        );

        let questions = challenge_questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionView::from_question(q, index))
            .collect();

        Ok(StartChallengeResponse {
            attempt_id: attempt.id.clone(),
            date: req.date,
            total_questions: attempt.total_questions(),
            questions,
            resumed: false,
            created_at: attempt.created_at,
        })
    }

    /// Scores the full answer batch, applies the streak bonus and marks the
    /// attempt completed. Records, counters and streak state land in one
    /// atomic store write; a second call for the same attempt is a state
    /// conflict with nothing changed.
    pub async fn complete_attempt(
        &self,
        attempt_id: &str,
        req: CompleteChallengeRequest,
    ) -> EngineResult<ChallengeResult> {
        Self::validate_request(&req)?;

        let _guard = self.locks.acquire(&attempt_lock_key(attempt_id)).await;

        let attempt = self
            .store
            .load_attempt(attempt_id)
            .await?
            .ok_or_else(|| EngineError::AttemptNotFound {
                attempt_id: attempt_id.to_string(),
            })?;

        if attempt.kind != AttemptKind::DailyChallenge {
            return Err(EngineError::invalid(
                "attempt: not a daily challenge attempt",
            ));
        }
        let date = attempt.challenge_date.ok_or_else(|| {
            EngineError::Store(anyhow::anyhow!(
                "daily attempt {} has no challenge date",
                attempt.id
            ))
        })?;
        if attempt.status == AttemptStatus::Completed {
            return Err(EngineError::AlreadyCompleted {
                user_id: attempt.user_id,
                date: date.to_string(),
            });
        }
        if attempt.status != AttemptStatus::Active {
            return Err(EngineError::AttemptNotActive {
                attempt_id: attempt_id.to_string(),
                status: attempt.status,
            });
        }

        let submissions = Self::validate_answer_set(&attempt, &req.answers)?;

        // Score in challenge order so record order indexes match the fixed
        // sequence.
        let mut records = Vec::with_capacity(attempt.total_questions());
        let mut answer_results = Vec::with_capacity(attempt.total_questions());
        let mut base_points_sum: u32 = 0;
        let mut correct_answers: u32 = 0;
        let now = Utc::now();

        for (order_index, question_id) in attempt.question_ids.iter().enumerate() {
            let submission = submissions[question_id.as_str()];
            let question = self
                .catalog
                .fetch_question(question_id)
                .await?
                .ok_or_else(|| EngineError::QuestionNotFound {
                    question_id: question_id.clone(),
                })?;

            let result = scoring::score(
                &question,
                &submission.selected_answer,
                submission.time_spent_seconds,
                self.scoring.max_time_bonus_rate,
            )?;

            base_points_sum += result.points_earned;
            if result.is_correct {
                correct_answers += 1;
            }

            records.push(AnswerRecord {
                id: Uuid::new_v4().to_string(),
                attempt_id: attempt.id.clone(),
                question_id: question.id.clone(),
                selected_answer: submission.selected_answer.clone(),
                time_spent_seconds: submission.time_spent_seconds,
                is_correct: result.is_correct,
                points_earned: result.points_earned,
                order_index,
                submitted_at: now,
            });
            answer_results.push(AnswerResult {
                question_id: question.id,
                is_correct: result.is_correct,
                correct_answer: question.correct_answer,
                explanation: question.explanation,
                base_points: result.base_points,
                time_bonus: result.time_bonus_fraction,
                points_earned: result.points_earned,
            });
        }

        let mut streak_state = self
            .store
            .load_streak(&attempt.user_id)
            .await?
            .unwrap_or_else(|| StreakState::new(&attempt.user_id));
        let previous_longest = streak_state.longest_streak;
        streak::advance(&mut streak_state, date);

        // The multiplier applies to the post-increment streak, and the
        // bonus multiplies the time-bonus-inclusive points sum.
        let streak_multiplier =
            streak::multiplier_for(&self.scoring.streak_tiers, streak_state.current_streak);
        let streak_bonus = streak::streak_bonus(base_points_sum, streak_multiplier);
        let final_score = base_points_sum + streak_bonus;

        let mut updated = attempt.clone();
        updated.current_index = updated.total_questions();
        updated.score = final_score;
        updated.correct_count = correct_answers;
        updated.status = AttemptStatus::Completed;
        updated.completed_at = Some(now);

        self.store
            .complete_daily_attempt(&updated, &records, &streak_state, attempt.version)
            .await?;

        let is_new_record = streak_state.current_streak > previous_longest;

        ATTEMPTS_TOTAL
            .with_label_values(&["daily_challenge", "completed"])
            .inc();
        ATTEMPTS_ACTIVE.dec();
        DAILY_CHALLENGES_COMPLETED_TOTAL
            .with_label_values(&[if is_new_record { "true" } else { "false" }])
            .inc();
        STREAK_LENGTH_DAYS.observe(f64::from(streak_state.current_streak));

        tracing::info!(
            "Daily challenge completed: attempt={}, user={}, score={} (base {}, bonus {}), streak={}",
            updated.id,
            updated.user_id,
            final_score,
            base_points_sum,
            streak_bonus,
            streak_state.current_streak
        );

        Ok(ChallengeResult {
            score: final_score,
            correct_answers,
            total_questions: updated.total_questions(),
            base_points: base_points_sum,
            streak_multiplier,
            streak_bonus,
            current_streak: streak_state.current_streak,
            longest_streak: streak_state.longest_streak,
            answer_results,
            is_new_record,
        })
    }

    /// Explicit per-operation validation enumerating every violation across
    /// the batch, not just the first.
    fn validate_request(req: &CompleteChallengeRequest) -> EngineResult<()> {
        let mut violations = Vec::new();
        if let Err(errors) = req.validate() {
            if let EngineError::InvalidInput { violations: v } =
                EngineError::from_validation(errors)
            {
                violations.extend(v);
            }
        }
        for (i, answer) in req.answers.iter().enumerate() {
            if let Err(errors) = answer.validate() {
                if let EngineError::InvalidInput { violations: v } =
                    EngineError::from_validation(errors)
                {
                    violations.extend(v.into_iter().map(|v| format!("answers[{}].{}", i, v)));
                }
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(EngineError::InvalidInput { violations })
        }
    }

    /// Batch shape checks: size equals the challenge's question count, ids
    /// unique, every id belongs to the challenge. Returns submissions keyed
    /// by question id.
    fn validate_answer_set<'a>(
        attempt: &Attempt,
        answers: &'a [AnswerSubmission],
    ) -> EngineResult<HashMap<&'a str, &'a AnswerSubmission>> {
        if answers.len() != attempt.total_questions() {
            return Err(EngineError::InvalidAnswerSet {
                reason: format!(
                    "expected {} answers, got {}",
                    attempt.total_questions(),
                    answers.len()
                ),
            });
        }

        let challenge_ids: HashSet<&str> =
            attempt.question_ids.iter().map(String::as_str).collect();
        let mut by_id = HashMap::with_capacity(answers.len());
        for answer in answers {
            if !challenge_ids.contains(answer.question_id.as_str()) {
                return Err(EngineError::InvalidAnswerSet {
                    reason: format!(
                        "question {} does not belong to this challenge",
                        answer.question_id
                    ),
                });
            }
            if by_id.insert(answer.question_id.as_str(), answer).is_some() {
                return Err(EngineError::InvalidAnswerSet {
                    reason: format!("duplicate answer for question {}", answer.question_id),
                });
            }
        }
        Ok(by_id)
    }

    async fn question_views(&self, attempt: &Attempt) -> EngineResult<Vec<QuestionView>> {
        let mut views = Vec::with_capacity(attempt.total_questions());
        for (index, question_id) in attempt.question_ids.iter().enumerate() {
            let question = self
                .catalog
                .fetch_question(question_id)
                .await?
                .ok_or_else(|| EngineError::QuestionNotFound {
                    question_id: question_id.clone(),
                })?;
            views.push(QuestionView::from_question(&question, index));
        }
        Ok(views)
    }
}
