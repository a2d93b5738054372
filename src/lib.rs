//! SimulateAI badges
//!
//! Badge bookkeeping for SimulateAI's AI-ethics scenarios: which scenarios a
//! learner completed per category, which badge tiers that unlocks, and when
//! those badges may be revealed.
//!
//! ## Flow
//!
//! 1. The UI reports a finished scenario. The completion is recorded and
//!    newly reached tiers are computed, each announced at most once.
//! 2. New badges are parked under the scenario that earned them.
//! 3. When the learner finishes that scenario's reflection step the badges
//!    are released for presentation.
//!
//! Progress is persisted through a [`store::StateStore`] (JSON files or
//! SQLite); tiers come from a TOML [`config::Config`].

pub mod badges;
pub mod config;
pub mod domain;
pub mod store;

pub use badges::{BadgeEngine, BadgeError, CategoryProgress, CompletionReport};
pub use domain::*;
