//! Consecutive-day streak arithmetic for the daily challenge. Pure calendar
//! logic, kept apart from the store-facing service so it can be tested
//! exhaustively.

use chrono::NaiveDate;

use crate::config::StreakTier;
use crate::models::streak::StreakState;

/// Advances the streak for a challenge completed on `date`.
///
/// Completing on the day immediately after `last_completed_date` extends the
/// streak by one; completing again on the same day leaves it unchanged (the
/// engine guards against this upstream, kept here for safety); anything else
/// restarts at 1. `longest_streak` never decreases.
pub fn advance(state: &mut StreakState, date: NaiveDate) {
    match state.last_completed_date {
        Some(last) if last == date => {}
        Some(last) if last.succ_opt() == Some(date) => state.current_streak += 1,
        _ => state.current_streak = 1,
    }
    state.longest_streak = state.longest_streak.max(state.current_streak);
    state.last_completed_date = Some(date);
}

/// Highest tier whose `min_days` does not exceed the (post-increment)
/// streak. Tiers are validated ascending at config load, so the reverse scan
/// finds the best match.
pub fn multiplier_for(tiers: &[StreakTier], streak_days: u32) -> f64 {
    tiers
        .iter()
        .rev()
        .find(|tier| tier.min_days <= streak_days)
        .map(|tier| tier.multiplier)
        .unwrap_or(1.0)
}

pub fn streak_bonus(base_points_sum: u32, multiplier: f64) -> u32 {
    (f64::from(base_points_sum) * (multiplier - 1.0)).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_streak_tiers;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    fn state(current: u32, longest: u32, last_day: Option<u32>) -> StreakState {
        StreakState {
            user_id: "u1".into(),
            current_streak: current,
            longest_streak: longest,
            last_completed_date: last_day.map(date),
        }
    }

    #[test]
    fn first_completion_starts_at_one() {
        let mut s = StreakState::new("u1");
        advance(&mut s, date(24));
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.longest_streak, 1);
        assert_eq!(s.last_completed_date, Some(date(24)));
    }

    #[test]
    fn next_day_completion_increments_by_one() {
        let mut s = state(6, 6, Some(23));
        advance(&mut s, date(24));
        assert_eq!(s.current_streak, 7);
        assert_eq!(s.longest_streak, 7);
    }

    #[test]
    fn same_day_completion_changes_nothing_but_the_date() {
        let mut s = state(4, 9, Some(24));
        advance(&mut s, date(24));
        assert_eq!(s.current_streak, 4);
        assert_eq!(s.longest_streak, 9);
    }

    #[test]
    fn gap_of_two_or_more_days_resets_to_one() {
        for last_day in [20, 21, 22] {
            let mut s = state(12, 12, Some(last_day));
            advance(&mut s, date(24));
            assert_eq!(s.current_streak, 1, "last_day={}", last_day);
            assert_eq!(s.longest_streak, 12);
        }
    }

    #[test]
    fn longest_streak_never_decreases() {
        let mut s = state(2, 30, Some(23));
        advance(&mut s, date(24));
        assert_eq!(s.current_streak, 3);
        assert_eq!(s.longest_streak, 30);
    }

    #[test]
    fn increment_crosses_month_boundary() {
        let mut s = state(1, 1, None);
        s.last_completed_date = NaiveDate::from_ymd_opt(2026, 8, 31);
        advance(&mut s, NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());
        assert_eq!(s.current_streak, 2);
    }

    #[test]
    fn multiplier_picks_highest_matching_tier() {
        let tiers = default_streak_tiers();
        assert_eq!(multiplier_for(&tiers, 1), 1.0);
        assert_eq!(multiplier_for(&tiers, 2), 1.0);
        assert_eq!(multiplier_for(&tiers, 3), 1.1);
        assert_eq!(multiplier_for(&tiers, 6), 1.1);
        assert_eq!(multiplier_for(&tiers, 7), 1.25);
        assert_eq!(multiplier_for(&tiers, 13), 1.25);
        assert_eq!(multiplier_for(&tiers, 14), 1.5);
        assert_eq!(multiplier_for(&tiers, 29), 1.5);
        assert_eq!(multiplier_for(&tiers, 30), 2.0);
        assert_eq!(multiplier_for(&tiers, 365), 2.0);
    }

    #[test]
    fn multiplier_is_monotonic_in_streak_length() {
        let tiers = default_streak_tiers();
        let mut previous = 0.0;
        for days in 1..=120 {
            let m = multiplier_for(&tiers, days);
            assert!(m >= previous, "multiplier dropped at {} days", days);
            previous = m;
        }
    }

    #[test]
    fn bonus_rounds_to_nearest_point() {
        assert_eq!(streak_bonus(80, 1.25), 20);
        assert_eq!(streak_bonus(80, 1.0), 0);
        assert_eq!(streak_bonus(10, 1.1), 1);
        assert_eq!(streak_bonus(15, 1.1), 2); // 1.5 rounds up
    }
}
