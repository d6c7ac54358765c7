//! Classifier configuration: artifact locations and sequence width.
//!
//! Loaded from `{data_path}/mindcare.toml`, then the `MINDCARE_CLASSIFIER`
//! env var (JSON), then defaults. Relative artifact paths resolve against the
//! data path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::DEFAULT_SEQUENCE_WIDTH;

const CONFIG_FILE: &str = "mindcare.toml";
const CONFIG_ENV: &str = "MINDCARE_CLASSIFIER";

/// Where the three classifier artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    #[serde(default = "default_model_config")]
    pub model_config: PathBuf,
    #[serde(default = "default_model_weights")]
    pub model_weights: PathBuf,
    #[serde(default = "default_tokenizer")]
    pub tokenizer: PathBuf,
    #[serde(default = "default_labels")]
    pub labels: PathBuf,
}

fn default_model_config() -> PathBuf {
    PathBuf::from("model.json")
}

fn default_model_weights() -> PathBuf {
    PathBuf::from("model.safetensors")
}

fn default_tokenizer() -> PathBuf {
    PathBuf::from("tokenizer.json")
}

fn default_labels() -> PathBuf {
    PathBuf::from("labels.json")
}

fn default_sequence_width() -> usize {
    DEFAULT_SEQUENCE_WIDTH
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model_config: default_model_config(),
            model_weights: default_model_weights(),
            tokenizer: default_tokenizer(),
            labels: default_labels(),
        }
    }
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::default().resolve(dir)
    }

    /// Make relative paths absolute with respect to `base`.
    pub fn resolve(self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        Self {
            model_config: join(self.model_config),
            model_weights: join(self.model_weights),
            tokenizer: join(self.tokenizer),
            labels: join(self.labels),
        }
    }
}

/// Classifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub artifacts: ArtifactPaths,
    /// Input width the model was trained on.
    #[serde(default = "default_sequence_width")]
    pub sequence_width: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::default(),
            sequence_width: DEFAULT_SEQUENCE_WIDTH,
        }
    }
}

/// Load classifier config with priority:
/// 1. `{data_path}/mindcare.toml` file
/// 2. `MINDCARE_CLASSIFIER` env var (JSON)
/// 3. Defaults
///
/// Parse failures are logged and fall through to the next source.
pub fn load_classifier_config(data_path: &Path) -> ClassifierConfig {
    let config = read_file_config(data_path)
        .or_else(read_env_config)
        .unwrap_or_default();

    ClassifierConfig {
        artifacts: config.artifacts.resolve(data_path),
        sequence_width: config.sequence_width,
    }
}

fn read_file_config(data_path: &Path) -> Option<ClassifierConfig> {
    let config_path = data_path.join(CONFIG_FILE);
    if !config_path.exists() {
        return None;
    }

    match std::fs::read_to_string(&config_path) {
        Ok(contents) => match toml::from_str::<ClassifierConfig>(&contents) {
            Ok(config) => {
                info!("Loaded classifier config from {}", config_path.display());
                Some(config)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                None
            }
        },
        Err(e) => {
            tracing::warn!(
                "Failed to read {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            None
        }
    }
}

fn read_env_config() -> Option<ClassifierConfig> {
    let json = std::env::var(CONFIG_ENV).ok()?;
    match serde_json::from_str::<ClassifierConfig>(&json) {
        Ok(config) => {
            info!("Loaded classifier config from {} env", CONFIG_ENV);
            Some(config)
        }
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}. Using defaults.", CONFIG_ENV, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_resolve_against_data_path() {
        let dir = TempDir::new().unwrap();
        let config = load_classifier_config(dir.path());
        assert_eq!(config.sequence_width, 100);
        assert_eq!(config.artifacts.tokenizer, dir.path().join("tokenizer.json"));
        assert_eq!(
            config.artifacts.model_weights,
            dir.path().join("model.safetensors")
        );
    }

    #[test]
    fn test_toml_overrides_width_and_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
sequence_width = 64

[artifacts]
tokenizer = "vocab/keras_tokenizer.json"
labels = "/opt/models/labels.json"
"#,
        )
        .unwrap();

        let config = load_classifier_config(dir.path());
        assert_eq!(config.sequence_width, 64);
        assert_eq!(
            config.artifacts.tokenizer,
            dir.path().join("vocab/keras_tokenizer.json")
        );
        assert_eq!(config.artifacts.labels, PathBuf::from("/opt/models/labels.json"));
        assert_eq!(config.artifacts.model_config, dir.path().join("model.json"));
    }

    #[test]
    fn test_partial_toml_keeps_default_width() {
        let config: ClassifierConfig = toml::from_str("[artifacts]\n").unwrap();
        assert_eq!(config, ClassifierConfig::default());
    }
}
