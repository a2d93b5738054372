//! CLI command implementations

pub mod init;
pub mod reset;
pub mod session;
pub mod status;
pub mod tiers;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use simulateai_badges::config::{Config, StateBackend, TierCatalog};
use simulateai_badges::store::{StateStore, open_store};
use simulateai_badges::{BadgeEngine, LearnerId};

/// Global options shared by all commands
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub backend: Option<StateBackend>,
    pub learner: String,
}

impl Context {
    pub fn config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(Config::global_config_path)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(Config::default_state_dir)
    }

    /// Load the config and validate it into a catalog
    pub fn load(&self) -> Result<(Config, Arc<TierCatalog>)> {
        let config = Config::load(Some(&self.config_path()))?;
        let catalog = config
            .catalog()
            .with_context(|| format!("Invalid badge config: {}", self.config_path().display()))?;
        Ok((config, Arc::new(catalog)))
    }

    /// Start an engine session for the selected learner
    pub fn open_engine(&self) -> Result<BadgeEngine<Box<dyn StateStore>>> {
        let (config, catalog) = self.load()?;
        let learner = LearnerId::new(self.learner.as_str())?;
        let backend = self.backend.unwrap_or(config.settings.state_backend);
        let store = open_store(backend, &self.state_dir())?;
        Ok(BadgeEngine::open(learner, catalog, &config.settings, store))
    }
}
