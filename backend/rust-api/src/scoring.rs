//! Pure per-answer scoring shared by the quiz session and daily challenge
//! engines. No I/O, no clock, fully deterministic.

use crate::error::{EngineError, EngineResult};
use crate::models::Question;

/// Up to +50% of the base points for an instant answer, unless overridden
/// via configuration.
pub const DEFAULT_MAX_TIME_BONUS_RATE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerScore {
    pub is_correct: bool,
    pub base_points: u32,
    /// Unused-time fraction in `[0, 1]`. Zero for incorrect answers and for
    /// answers at or past the time limit.
    pub time_bonus_fraction: f64,
    pub points_earned: u32,
}

/// Scores a single answer against its question.
///
/// Correctness is exact string equality after trimming both sides; the
/// catalog stores `correct_answer` already normalized, the trim guards
/// against stray whitespace from clients. A negative or non-finite
/// `time_spent_seconds` is rejected as invalid input; values at or beyond
/// the time limit yield zero bonus, never a negative one.
pub fn score(
    question: &Question,
    selected_answer: &str,
    time_spent_seconds: f64,
    max_time_bonus_rate: f64,
) -> EngineResult<AnswerScore> {
    if !time_spent_seconds.is_finite() || time_spent_seconds < 0.0 {
        return Err(EngineError::invalid(
            "time_spent_seconds: must be a finite value >= 0",
        ));
    }

    let is_correct = selected_answer.trim() == question.correct_answer.trim();
    if !is_correct {
        return Ok(AnswerScore {
            is_correct: false,
            base_points: question.base_points,
            time_bonus_fraction: 0.0,
            points_earned: 0,
        });
    }

    let limit = f64::from(question.time_limit_seconds);
    // A zero limit means "untimed": no bonus rather than a division by zero.
    let time_bonus_fraction = if limit > 0.0 {
        ((limit - time_spent_seconds) / limit).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let points_earned = (f64::from(question.base_points)
        * (1.0 + time_bonus_fraction * max_time_bonus_rate))
        .round() as u32;

    Ok(AnswerScore {
        is_correct: true,
        base_points: question.base_points,
        time_bonus_fraction,
        points_earned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuestionKind};

    fn question(base_points: u32, time_limit_seconds: u32) -> Question {
        Question {
            id: "q1".into(),
            category_id: "geo".into(),
            difficulty: Difficulty::Easy,
            kind: QuestionKind::SingleChoice,
            prompt: "Capital of France?".into(),
            options: vec!["Paris".into(), "Lyon".into()],
            correct_answer: "Paris".into(),
            base_points,
            time_limit_seconds,
            explanation: None,
        }
    }

    #[test]
    fn correct_answer_at_half_time_earns_half_bonus() {
        // basePoints=10, timeLimit=30, timeSpent=15, rate=0.5 -> 13
        let result = score(&question(10, 30), "Paris", 15.0, 0.5).unwrap();
        assert!(result.is_correct);
        assert_eq!(result.base_points, 10);
        assert!((result.time_bonus_fraction - 0.5).abs() < f64::EPSILON);
        assert_eq!(result.points_earned, 13);
    }

    #[test]
    fn instant_answer_earns_full_bonus() {
        let result = score(&question(10, 30), "Paris", 0.0, 0.5).unwrap();
        assert!((result.time_bonus_fraction - 1.0).abs() < f64::EPSILON);
        assert_eq!(result.points_earned, 15);
    }

    #[test]
    fn answer_at_or_past_the_limit_earns_no_bonus() {
        for spent in [30.0, 31.0, 90.0, 1e6] {
            let result = score(&question(10, 30), "Paris", spent, 0.5).unwrap();
            assert_eq!(result.time_bonus_fraction, 0.0, "spent={}", spent);
            assert_eq!(result.points_earned, 10);
        }
    }

    #[test]
    fn incorrect_answer_earns_zero_regardless_of_time() {
        for spent in [0.0, 1.0, 15.0, 29.9, 30.0, 100.0] {
            let result = score(&question(10, 30), "Lyon", spent, 0.5).unwrap();
            assert!(!result.is_correct);
            assert_eq!(result.points_earned, 0);
            assert_eq!(result.time_bonus_fraction, 0.0);
        }
    }

    #[test]
    fn correctness_trims_whitespace_but_is_case_sensitive() {
        assert!(score(&question(10, 30), "  Paris ", 5.0, 0.5).unwrap().is_correct);
        assert!(!score(&question(10, 30), "paris", 5.0, 0.5).unwrap().is_correct);
    }

    #[test]
    fn negative_or_non_finite_time_is_rejected() {
        for spent in [-0.1, -30.0, f64::NAN, f64::INFINITY] {
            let err = score(&question(10, 30), "Paris", spent, 0.5).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn zero_time_limit_yields_no_bonus() {
        let result = score(&question(10, 0), "Paris", 5.0, 0.5).unwrap();
        assert_eq!(result.time_bonus_fraction, 0.0);
        assert_eq!(result.points_earned, 10);
    }

    #[test]
    fn bonus_fraction_stays_bounded_and_never_grows_with_time() {
        let q = question(20, 45);
        let mut previous = f64::MAX;
        for tenths in 0..=1200 {
            let spent = f64::from(tenths) / 10.0;
            let result = score(&q, "Paris", spent, 0.5).unwrap();
            assert!((0.0..=1.0).contains(&result.time_bonus_fraction));
            assert!(result.time_bonus_fraction <= previous);
            assert!(result.points_earned >= q.base_points);
            assert!(result.points_earned <= (f64::from(q.base_points) * 1.5).round() as u32);
            previous = result.time_bonus_fraction;
        }
    }
}
