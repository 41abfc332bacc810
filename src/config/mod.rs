//! Configuration for the UI consumer thread and the demo workloads.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProgressError, Result};

/// Default `indicatif` template used by the terminal facade.
pub const DEFAULT_TEMPLATE: &str = "{msg:24} [{bar:40.cyan/blue}] {pos:>3}%";

/// Default name given to the UI-affinity thread.
pub const DEFAULT_UI_THREAD_NAME: &str = "progress-ui";

/// Settings for the UI-affinity consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Draw progress bars. When false, trackers are bound to no UI at all.
    pub enabled: bool,
    /// `indicatif` style template for progress bars.
    pub template: String,
    /// Name of the spawned UI thread.
    pub thread_name: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            template: DEFAULT_TEMPLATE.to_string(),
            thread_name: DEFAULT_UI_THREAD_NAME.to_string(),
        }
    }
}

/// Settings for the producer side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of producer threads (0 = one per CPU).
    pub threads: usize,
}

impl WorkerConfig {
    /// Resolve the effective thread count.
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// UI consumer settings.
    pub ui: UiConfig,
    /// Producer settings.
    pub workers: WorkerConfig,
}

impl Config {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Check values that serde alone cannot reject.
    pub fn validate(&self) -> Result<()> {
        if self.ui.thread_name.trim().is_empty() {
            return Err(ProgressError::Config(
                "ui.thread_name must not be empty".into(),
            ));
        }
        if self.ui.enabled && self.ui.template.trim().is_empty() {
            return Err(ProgressError::Config(
                "ui.template must not be empty when the UI is enabled".into(),
            ));
        }
        Ok(())
    }
}
