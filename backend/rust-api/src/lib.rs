//! Quiz session / daily challenge scoring engine.
//!
//! The crate owns the scoring model, the quiz-session and daily-challenge
//! state machines and the streak calculator. HTTP routing, authentication
//! and real persistence are external collaborators: the embedding service
//! wires [`store::QuestionCatalog`] and [`store::AttemptStore`]
//! implementations into [`AppState`] and calls the services.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod scoring;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use services::{AppState, ChallengeService, QuizService};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes tracing with an env-filter and fmt layer. Called once by the
/// embedding binary (and the test harness); repeated calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizcore_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
