//! # promptforge-config
//!
//! TOML configuration for promptforge.
//!
//! ## Overview
//!
//! [`Settings`] covers the model endpoint, both retry loops, the output
//! directory, and log retention. Every key has a default, so an empty file
//! (or no file) is a valid configuration. `OLLAMA_BASE_URL` and
//! `OLLAMA_MODEL` override the file.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use promptforge_config::Settings;
//!
//! let settings = Settings::load(Some(Path::new("config/promptforge.toml")))?;
//! let backoff = settings.generation.backoff();
//! ```

pub mod loader;
pub mod settings;

pub use loader::{DEFAULT_CONFIG_FILE, ENV_BASE_URL, ENV_MODEL};
pub use settings::{
    BatchSection, GenerationSettings, LoggingSettings, ModelSettings, OutputSettings, Settings,
};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::PathBuf, time::Duration};

    use promptforge_contracts::error::ForgeError;

    use crate::Settings;

    const SAMPLE: &str = include_str!("../../../config/promptforge.toml");

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    // ── 1. defaults ───────────────────────────────────────────────────────────

    #[test]
    fn empty_document_yields_defaults() {
        let settings = Settings::from_toml_str("").unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model.base_url, "http://localhost:11434");
        assert_eq!(settings.model.model, "llama3.2");
        assert_eq!(settings.generation.max_retries, 3);
        assert_eq!(settings.batch.item_retries, 3);
        assert_eq!(settings.logging.retention_days, 7);
        assert_eq!(settings.logging.error_retention_days, 30);
        settings.validate().unwrap();
    }

    #[test]
    fn default_backoff_is_two_then_four_seconds() {
        let backoff = Settings::default().generation.backoff();
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
    }

    // ── 2. parsing ────────────────────────────────────────────────────────────

    #[test]
    fn shipped_sample_parses_and_validates() {
        let settings = Settings::from_toml_str(SAMPLE).unwrap();
        settings.validate().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            [generation]
            max_retries = 5

            [output]
            dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(settings.generation.max_retries, 5);
        assert_eq!(settings.generation.backoff_base, 2);
        assert_eq!(settings.output.dir, PathBuf::from("out"));
        assert_eq!(settings.batch_settings().inner_retries, 5);
        assert_eq!(settings.batch_settings().item_retries, 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Settings::from_toml_str("[model]\nendpoint = \"x\"\n").unwrap_err();
        assert!(matches!(err, ForgeError::Config { .. }));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::from_file(&dir.path().join("nope.toml")).unwrap_err();

        match err {
            ForgeError::Config { reason } => assert!(reason.contains("nope.toml")),
            other => panic!("expected Config, got {:?}", other),
        }
    }

    #[test]
    fn load_reads_an_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[batch]\nitem_retries = 4\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.batch.item_retries, 4);
    }

    // ── 3. environment ────────────────────────────────────────────────────────

    #[test]
    fn environment_overrides_file_values() {
        let mut settings =
            Settings::from_toml_str("[model]\nbase_url = \"http://file:1\"\nmodel = \"m\"\n").unwrap();

        settings.apply_env(env(&[
            ("OLLAMA_BASE_URL", "http://gpu-box:11434"),
            ("OLLAMA_MODEL", "llama3.1:70b"),
        ]));

        assert_eq!(settings.model.base_url, "http://gpu-box:11434");
        assert_eq!(settings.model.model, "llama3.1:70b");
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let mut settings = Settings::default();
        settings.apply_env(env(&[("OLLAMA_MODEL", "  ")]));
        assert_eq!(settings.model.model, "llama3.2");
    }

    // ── 4. validation ─────────────────────────────────────────────────────────

    #[test]
    fn zero_retries_fail_validation() {
        let settings = Settings::from_toml_str("[generation]\nmax_retries = 0\n").unwrap();
        let err = settings.validate().unwrap_err();

        match err {
            ForgeError::Config { reason } => assert!(reason.contains("max_retries")),
            other => panic!("expected Config, got {:?}", other),
        }
    }

    #[test]
    fn empty_model_name_fails_validation() {
        let mut settings = Settings::default();
        settings.model.model = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_retention_fails_validation() {
        let settings = Settings::from_toml_str("[logging]\nerror_retention_days = 0\n").unwrap();
        assert!(settings.validate().is_err());
    }
}
