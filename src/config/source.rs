//! Live configuration sources consumed by the dispatcher

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::warn;

use super::loader::load_config;
use super::types::MarketConfig;
use crate::common::traits::ConfigurationSource;
use crate::market::reduction::ReductionTier;

/// In-memory configuration that can be swapped at runtime
#[derive(Debug, Clone, Default)]
pub struct StaticConfiguration {
    current: Arc<RwLock<MarketConfig>>,
}

impl StaticConfiguration {
    pub fn new(config: MarketConfig) -> Self {
        Self {
            current: Arc::new(RwLock::new(config)),
        }
    }

    /// Replace the whole snapshot
    pub fn replace(&self, config: MarketConfig) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = config;
    }

    /// Edit the snapshot in place
    pub fn update(&self, edit: impl FnOnce(&mut MarketConfig)) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        edit(&mut current);
    }
}

impl ConfigurationSource for StaticConfiguration {
    fn all(&self) -> MarketConfig {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Configuration re-read from disk (and the environment) on every call
///
/// A file that fails to parse keeps the previous good snapshot in effect,
/// reduction tables included.
#[derive(Debug)]
pub struct FileConfiguration {
    path: PathBuf,
    last_good: RwLock<MarketConfig>,
    last_reductions: RwLock<Option<HashMap<String, Vec<ReductionTier>>>>,
}

impl FileConfiguration {
    /// Create a source for `path`, seeded with `initial`
    pub fn new(path: impl Into<PathBuf>, initial: MarketConfig) -> Self {
        Self {
            path: path.into(),
            last_good: RwLock::new(initial),
            last_reductions: RwLock::new(None),
        }
    }
}

impl ConfigurationSource for FileConfiguration {
    fn all(&self) -> MarketConfig {
        match load_config(self.path.to_str()) {
            Ok(config) => {
                let mut reductions = self
                    .last_reductions
                    .write()
                    .unwrap_or_else(|e| e.into_inner());
                *reductions = Some(config.reductions);
                let mut last_good = self.last_good.write().unwrap_or_else(|e| e.into_inner());
                *last_good = config.market.clone();
                config.market
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Keeping previous configuration: {}", e);
                self.last_good
                    .read()
                    .unwrap_or_else(|e| e.into_inner())
                    .clone()
            }
        }
    }

    fn reductions(&self) -> Option<HashMap<String, Vec<ReductionTier>>> {
        self.last_reductions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
