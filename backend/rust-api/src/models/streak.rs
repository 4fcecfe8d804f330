use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-user consecutive-day state. One per user, independent of any single
/// attempt; mutated only when a daily attempt completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakState {
    pub user_id: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed_date: Option<NaiveDate>,
}

impl StreakState {
    pub fn new(user_id: &str) -> Self {
        StreakState {
            user_id: user_id.to_string(),
            current_streak: 0,
            longest_streak: 0,
            last_completed_date: None,
        }
    }
}
