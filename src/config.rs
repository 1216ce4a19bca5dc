//! Configuration for the scheduler thread and the bundled dispatcher.
//!
//! Every section uses `#[serde(default)]`, so a TOML file only needs the keys
//! it wants to override:
//!
//! ```toml
//! [scheduler]
//! thread_name = "scheduler"
//!
//! [dispatcher]
//! thread_name = "dispatcher"
//! task_expiration_ms = 2000
//! ```

use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Waiting-loop thread settings.
    pub scheduler: SchedulerConfig,
    /// Dispatcher worker settings.
    pub dispatcher: DispatcherConfig,
}

/// Scheduler thread configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Name given to the dedicated waiting thread.
    pub thread_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thread_name: "scheduler".to_owned(),
        }
    }
}

/// Dispatcher worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Name given to the dispatcher worker thread.
    pub thread_name: String,
    /// How long (ms) an expiring task may sit in the queue before it is
    /// discarded unrun. `0` disables expiry.
    pub task_expiration_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            thread_name: "dispatcher".to_owned(),
            task_expiration_ms: 2000,
        }
    }
}

impl DispatcherConfig {
    /// Queue expiry window, or `None` when expiry is disabled.
    pub fn task_expiration(&self) -> Option<Duration> {
        (self.task_expiration_ms > 0).then(|| Duration::from_millis(self.task_expiration_ms))
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| SchedulerError::Config(format!("cannot parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SchedulerError::Config(format!("cannot serialize config: {e}")))
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `scheduler.thread_name` must not be empty
    /// - `dispatcher.thread_name` must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.thread_name.trim().is_empty() {
            return Err(SchedulerError::Config(
                "scheduler.thread_name must not be empty".into(),
            ));
        }
        if self.dispatcher.thread_name.trim().is_empty() {
            return Err(SchedulerError::Config(
                "dispatcher.thread_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
