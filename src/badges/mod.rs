//! Badge tiers and deferred reveal
//!
//! Learners earn badge tiers per category by completing distinct scenarios.
//! A badge earned by a scenario is held back until the reflection step of
//! that same scenario is finished.
//!
//! # Usage
//!
//! ```ignore
//! let mut engine = BadgeEngine::open(learner, catalog, &config.settings, store);
//!
//! // Scenario finished: badges are computed but not shown yet
//! let report = engine.on_scenario_completed("trolley-problem", "runaway-tram")?;
//!
//! // Reflection finished: now present them
//! for badge in engine.on_reflection_completed("runaway-tram")? {
//!     show(badge);
//! }
//! ```

mod engine;
mod error;
mod evaluator;
mod progress;
mod reveal;
mod state;
mod tracker;

pub use engine::{BadgeEngine, CompletionReport, StorageWarning};
pub use error::BadgeError;
pub use evaluator::TierEvaluator;
pub use progress::CategoryProgress;
pub use reveal::{DeferredEntry, DeferredRevealQueue};
pub use state::{BadgeUnlockState, CompletionRecord, ProgressState, STATE_SCHEMA_VERSION};
pub use tracker::{CompletionOutcome, CompletionTracker};
