//! # Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config FILE`)
//! 3. Environment variables (`MNEMOGRAPH_*`)
//! 4. Command-line flags
//!
//! The structural threshold is validated once, when the weighting policy is
//! built from the final settings.

use mnemograph_core::WeightingPolicy;
use mnemograph_core::primitives::DEFAULT_STRUCTURAL_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_GRAPH_PATH: &str = "MNEMOGRAPH_GRAPH_PATH";
pub const ENV_CORPUS_PATH: &str = "MNEMOGRAPH_CORPUS_PATH";
pub const ENV_STRUCTURAL_THRESHOLD: &str = "MNEMOGRAPH_STRUCTURAL_THRESHOLD";

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Structural threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Snapshot file of the association graph.
    pub graph_path: PathBuf,
    /// redb database holding the asset corpus.
    pub corpus_path: PathBuf,
    /// Similarity above which an observation is structural.
    pub structural_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::from("data/graph.mnem"),
            corpus_path: PathBuf::from("data/corpus.redb"),
            structural_threshold: DEFAULT_STRUCTURAL_THRESHOLD,
        }
    }
}

impl Settings {
    /// Defaults, overlaid with the TOML file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `MNEMOGRAPH_*` variables read through `lookup`.
    ///
    /// Production passes `|k| std::env::var(k).ok()`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup(ENV_GRAPH_PATH) {
            self.graph_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_CORPUS_PATH) {
            self.corpus_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_STRUCTURAL_THRESHOLD) {
            self.structural_threshold =
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidEnv {
                        name: ENV_STRUCTURAL_THRESHOLD,
                        value: raw.clone(),
                    })?;
        }
        Ok(())
    }

    /// Weighting policy for these settings.
    pub fn policy(&self) -> Result<WeightingPolicy, ConfigError> {
        WeightingPolicy::new(self.structural_threshold)
            .map_err(|_| ConfigError::InvalidThreshold(self.structural_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn no_file_gives_defaults() {
        let settings = Settings::load(None).expect("defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.structural_threshold, 0.8);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("mnemograph.toml");
        std::fs::write(&path, "structural_threshold = 0.65\n").expect("write");

        let settings = Settings::load(Some(&path)).expect("load");
        assert_eq!(settings.structural_threshold, 0.65);
        assert_eq!(settings.graph_path, PathBuf::from("data/graph.mnem"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("mnemograph.toml");
        std::fs::write(&path, "threshold = 0.5\n").expect("write");

        assert!(matches!(
            Settings::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp = tempdir().expect("temp dir");
        let result = Settings::load(Some(&temp.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                (ENV_GRAPH_PATH, "/tmp/g.mnem"),
                (ENV_STRUCTURAL_THRESHOLD, " 0.9 "),
            ]))
            .expect("env");

        assert_eq!(settings.graph_path, PathBuf::from("/tmp/g.mnem"));
        assert_eq!(settings.corpus_path, PathBuf::from("data/corpus.redb"));
        assert_eq!(settings.structural_threshold, 0.9);
    }

    #[test]
    fn non_numeric_env_threshold_is_rejected() {
        let mut settings = Settings::default();
        let result = settings.apply_env(env(&[(ENV_STRUCTURAL_THRESHOLD, "high")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn out_of_range_threshold_has_no_policy() {
        let settings = Settings {
            structural_threshold: 1.5,
            ..Settings::default()
        };
        assert!(matches!(
            settings.policy(),
            Err(ConfigError::InvalidThreshold(t)) if t == 1.5
        ));
    }
}
