use serde::Deserialize;
use std::env;

use crate::scoring::DEFAULT_MAX_TIME_BONUS_RATE;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scoring: ScoringConfig,
}

/// Tunable scoring parameters. Values come from `config/{APP_ENV}.toml`
/// and/or `APP_`-prefixed environment variables, with compiled defaults as
/// the final fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Maximum time-bonus rate: 0.5 means up to +50% for instant answers.
    pub max_time_bonus_rate: f64,
    /// Used when a start-quiz request omits `question_count`.
    pub default_question_count: u32,
    pub min_question_count: u32,
    pub max_question_count: u32,
    /// Ascending tiers; the highest tier with `min_days <= streak` applies.
    pub streak_tiers: Vec<StreakTier>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreakTier {
    pub min_days: u32,
    pub multiplier: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            max_time_bonus_rate: DEFAULT_MAX_TIME_BONUS_RATE,
            default_question_count: 10,
            min_question_count: 1,
            max_question_count: 50,
            streak_tiers: default_streak_tiers(),
        }
    }
}

pub fn default_streak_tiers() -> Vec<StreakTier> {
    vec![
        StreakTier { min_days: 1, multiplier: 1.0 },
        StreakTier { min_days: 3, multiplier: 1.1 },
        StreakTier { min_days: 7, multiplier: 1.25 },
        StreakTier { min_days: 14, multiplier: 1.5 },
        StreakTier { min_days: 30, multiplier: 2.0 },
    ]
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to defaults
            )
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = ScoringConfig::default();

        let scoring = ScoringConfig {
            max_time_bonus_rate: settings
                .get_float("scoring.max_time_bonus_rate")
                .unwrap_or(defaults.max_time_bonus_rate),
            default_question_count: settings
                .get_int("scoring.default_question_count")
                .map(|v| v as u32)
                .unwrap_or(defaults.default_question_count),
            min_question_count: settings
                .get_int("scoring.min_question_count")
                .map(|v| v as u32)
                .unwrap_or(defaults.min_question_count),
            max_question_count: settings
                .get_int("scoring.max_question_count")
                .map(|v| v as u32)
                .unwrap_or(defaults.max_question_count),
            streak_tiers: settings
                .get::<Vec<StreakTier>>("scoring.streak_tiers")
                .unwrap_or(defaults.streak_tiers),
        };

        scoring.validate()?;

        Ok(Config { scoring })
    }
}

impl ScoringConfig {
    /// Rejects tier tables that would break the scoring invariants: tiers
    /// must start at day 1, be strictly ascending in `min_days`, and carry a
    /// non-decreasing multiplier of at least 1.0.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.max_time_bonus_rate < 0.0 || !self.max_time_bonus_rate.is_finite() {
            return Err(config::ConfigError::Message(
                "scoring.max_time_bonus_rate must be a finite value >= 0".into(),
            ));
        }
        if self.min_question_count == 0 || self.min_question_count > self.max_question_count {
            return Err(config::ConfigError::Message(
                "scoring question count bounds must satisfy 1 <= min <= max".into(),
            ));
        }
        if !(self.min_question_count..=self.max_question_count)
            .contains(&self.default_question_count)
        {
            return Err(config::ConfigError::Message(
                "scoring.default_question_count must fall within the configured bounds".into(),
            ));
        }

        if self.streak_tiers.first().map(|t| t.min_days) != Some(1) {
            return Err(config::ConfigError::Message(
                "scoring.streak_tiers must start at min_days = 1".into(),
            ));
        }
        for pair in self.streak_tiers.windows(2) {
            if pair[1].min_days <= pair[0].min_days {
                return Err(config::ConfigError::Message(
                    "scoring.streak_tiers must be strictly ascending in min_days".into(),
                ));
            }
            if pair[1].multiplier < pair[0].multiplier {
                return Err(config::ConfigError::Message(
                    "scoring.streak_tiers multiplier must be non-decreasing".into(),
                ));
            }
        }
        if self.streak_tiers.iter().any(|t| t.multiplier < 1.0) {
            return Err(config::ConfigError::Message(
                "scoring.streak_tiers multiplier must be >= 1.0".into(),
            ));
        }

        Ok(())
    }
}
