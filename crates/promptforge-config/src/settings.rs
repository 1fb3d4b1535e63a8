//! Configuration schema.
//!
//! `Settings` is deserialized from TOML. Every table and key is optional;
//! anything left out takes its default.
//!
//! ```toml
//! [model]
//! base_url = "http://localhost:11434"
//! model = "llama3.2"
//! timeout_secs = 120
//!
//! [generation]
//! max_retries = 3
//! backoff_base = 2
//! backoff_unit_ms = 1000
//!
//! [batch]
//! item_retries = 3
//!
//! [output]
//! dir = "."
//!
//! [logging]
//! dir = "."
//! retention_days = 7
//! error_retention_days = 30
//! ```

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use promptforge_core::{Backoff, BatchSettings};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub model: ModelSettings,
    pub generation: GenerationSettings,
    pub batch: BatchSection,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

/// Where the model lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSettings {
    pub base_url: String,
    pub model: String,
    /// Per-request timeout. Generation is slow; keep this generous.
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ModelSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// The single-record retry loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSettings {
    /// Model calls per generation.
    pub max_retries: u32,
    pub backoff_base: u32,
    pub backoff_unit_ms: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: 2,
            backoff_unit_ms: 1000,
        }
    }
}

impl GenerationSettings {
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.backoff_base, Duration::from_millis(self.backoff_unit_ms))
    }
}

/// The outer, per-item retry loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchSection {
    pub item_retries: u32,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self { item_retries: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

/// Rotating log files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub dir: PathBuf,
    /// Daily files kept for the full DEBUG log.
    pub retention_days: usize,
    /// Daily files kept for `error.log`.
    pub error_retention_days: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            retention_days: 7,
            error_retention_days: 30,
        }
    }
}

impl Settings {
    /// Retry budgets for the batch driver.
    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            item_retries: self.batch.item_retries,
            inner_retries: self.generation.max_retries,
        }
    }
}
