//! Core domain types shared by the badge engine, config and stores

mod badge;
mod ids;

pub use badge::{Badge, DEFAULT_TIER_ICON, TierDefinition};
pub use ids::{CategoryId, LearnerId, ScenarioId};
