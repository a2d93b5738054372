//! Shared test utilities for badge engine integration tests

#![allow(dead_code)]

use std::sync::Arc;

use simulateai_badges::config::{Config, Settings, TierCatalog};
use simulateai_badges::store::StateStore;
use simulateai_badges::{BadgeEngine, LearnerId};

/// Catalog with `ethics-101` tiers at 3, 6 and 10 completions plus a small `privacy` category
pub const TEST_CONFIG: &str = r#"
[settings]
max_pending_entries = 4

[[category]]
id = "ethics-101"
title = "Ethics 101"
total_scenarios = 12

[[category.tier]]
requirement = 3
title = "Ethics Explorer"

[[category.tier]]
requirement = 6
title = "Ethics Practitioner"

[[category.tier]]
requirement = 10
title = "Ethics Expert"

[[category]]
id = "privacy"

[[category.tier]]
requirement = 1
title = "Privacy Aware"
"#;

pub fn test_config() -> Config {
    Config::from_toml(TEST_CONFIG).expect("test config parses")
}

pub fn test_catalog() -> Arc<TierCatalog> {
    Arc::new(test_config().catalog().expect("test config is valid"))
}

pub fn test_settings() -> Settings {
    test_config().settings
}

pub fn learner(id: &str) -> LearnerId {
    LearnerId::new(id).expect("valid learner id")
}

/// Open an engine for `learner` on the test catalog
pub fn open_engine<S: StateStore>(id: &str, store: S) -> BadgeEngine<S> {
    BadgeEngine::open(learner(id), test_catalog(), &test_settings(), store)
}

/// Titles of a badge list, in order
pub fn titles(badges: &[simulateai_badges::Badge]) -> Vec<String> {
    badges.iter().map(|b| b.title().to_string()).collect()
}
