//! Loading and validating `Settings`.
//!
//! Resolution order, later wins:
//!
//! 1. built-in defaults;
//! 2. the TOML file (an explicit path, or `promptforge.toml` in the working
//!    directory when present);
//! 3. `OLLAMA_BASE_URL` and `OLLAMA_MODEL` from the environment.
//!
//! The result is validated before it is returned.

use std::path::Path;

use tracing::{debug, info};

use promptforge_contracts::error::{ForgeError, ForgeResult};

use crate::settings::Settings;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "promptforge.toml";

pub const ENV_BASE_URL: &str = "OLLAMA_BASE_URL";
pub const ENV_MODEL: &str = "OLLAMA_MODEL";

impl Settings {
    /// Parse `s` as TOML.
    ///
    /// Returns `ForgeError::Config` if the TOML is malformed or has keys
    /// `Settings` does not know.
    pub fn from_toml_str(s: &str) -> ForgeResult<Self> {
        toml::from_str(s).map_err(|e| ForgeError::Config {
            reason: format!("failed to parse config TOML: {e}"),
        })
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> ForgeResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ForgeError::Config {
            reason: format!("failed to read config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Full resolution: defaults, file, environment, validation.
    pub fn load(path: Option<&Path>) -> ForgeResult<Self> {
        let mut settings = match path {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                Self::from_file(path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                info!(path = DEFAULT_CONFIG_FILE, "loading config");
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("no config file, using defaults");
                Self::default()
            }
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment overrides through `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = present(ENV_BASE_URL) {
            debug!(key = ENV_BASE_URL, value = %url, "environment override");
            self.model.base_url = url;
        }
        if let Some(model) = present(ENV_MODEL) {
            debug!(key = ENV_MODEL, value = %model, "environment override");
            self.model.model = model;
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> ForgeResult<()> {
        let invalid = |reason: &str| -> ForgeResult<()> {
            Err(ForgeError::Config {
                reason: reason.to_string(),
            })
        };

        if self.model.base_url.trim().is_empty() {
            return invalid("model.base_url must not be empty");
        }
        if self.model.model.trim().is_empty() {
            return invalid("model.model must not be empty");
        }
        if self.model.timeout_secs == 0 {
            return invalid("model.timeout_secs must be at least 1");
        }
        if self.generation.max_retries == 0 {
            return invalid("generation.max_retries must be at least 1");
        }
        if self.generation.backoff_base == 0 {
            return invalid("generation.backoff_base must be at least 1");
        }
        if self.batch.item_retries == 0 {
            return invalid("batch.item_retries must be at least 1");
        }
        if self.logging.retention_days == 0 || self.logging.error_retention_days == 0 {
            return invalid("logging retention must be at least 1 day");
        }
        Ok(())
    }
}
