use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

/// Application-level constants
pub const APP_NAME: &str = "sectorscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Env var holding a `tracing_subscriber::EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "SECTORSCAN_LOG";

/// Env var enabling the diagnostic dump (overrides `dump_dir`).
pub const DUMP_ENV_VAR: &str = "SECTORSCAN_DUMP_DIR";

const CONFIG_FILE: &str = "config.json";

/// Log filter used when `SECTORSCAN_LOG` is unset or invalid.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "sectorscan_lib=debug,sectorscan=debug,warn"
    } else {
        "sectorscan_lib=info,sectorscan=info,warn"
    }
}

/// Per-user config directory, e.g. `~/.config/sectorscan` on Linux.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Default location of the config file, whether or not it exists.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Classifier switches. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Enables the sentence-scanning extraction tier.
    pub sentence_fallback: bool,
    /// Maps spelling variants onto the fixed industry vocabulary.
    pub canonicalize_industries: bool,
    /// Passes one index when every index fails validation.
    pub forced_pass: bool,
    /// JSON file replacing the built-in canonical schema.
    pub schema_path: Option<PathBuf>,
    pub dump_dir: Option<PathBuf>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sentence_fallback: true,
            canonicalize_industries: true,
            forced_pass: true,
            schema_path: None,
            dump_dir: None,
        }
    }
}

impl ClassifierConfig {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Reads a config file. A missing or malformed file is an error.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Explicit path, else the per-user file when present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, PipelineError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Loading user config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_fallback() {
        let config = ClassifierConfig::default();
        assert!(config.sentence_fallback);
        assert!(config.canonicalize_industries);
        assert!(config.forced_pass);
        assert!(config.schema_path.is_none());
        assert!(config.dump_dir.is_none());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = ClassifierConfig::from_json(r#"{"forced_pass": false}"#).unwrap();
        assert!(!config.forced_pass);
        assert!(config.sentence_fallback);
    }

    #[test]
    fn explicit_file_is_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"sentence_fallback": false, "dump_dir": "/tmp/dumps"}"#,
        )
        .unwrap();

        let config = ClassifierConfig::load(Some(&path)).unwrap();
        assert!(!config.sentence_fallback);
        assert_eq!(config.dump_dir, Some(PathBuf::from("/tmp/dumps")));
    }

    #[test]
    fn malformed_file_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ClassifierConfig::load(Some(&path)),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            ClassifierConfig::load(Some(&tmp.path().join("absent.json"))),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn config_dir_ends_with_app_name() {
        if let Some(dir) = config_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
