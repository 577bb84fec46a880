use anyhow::{ensure, Context};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_LABELS: [&str; 10] = [
    "Chameleon",
    "Crocodile_Alligator",
    "Frog",
    "Gecko",
    "Iguana",
    "Lizard",
    "Salamander",
    "Snake",
    "Toad",
    "Turtle_Tortoise",
];

pub const DEFAULT_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on the request body accepted by `/predict`.
    pub max_upload_bytes: usize,
    /// Install the Prometheus recorder and serve `/metrics`.
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 16 * 1024 * 1024,
            metrics: true,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Edge length of the square image the model expects.
    pub input_size: u32,
    pub intra_threads: usize,
    /// Class names, positionally aligned with the model output.
    pub labels: Vec<String>,
    pub allowed_extensions: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/reptile_model.onnx"),
            input_size: crate::preprocessing::image::DEFAULT_INPUT_SIZE,
            intra_threads: 4,
            labels: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Reads the YAML file at `path`, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.model.labels.is_empty(), "model.labels must not be empty");
        ensure!(
            !self.model.allowed_extensions.is_empty(),
            "model.allowed_extensions must not be empty"
        );
        ensure!(self.model.input_size > 0, "model.input_size must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_reptile_model() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.model.input_size, 224);
        assert_eq!(config.model.labels.len(), 10);
        assert_eq!(config.model.labels[0], "Chameleon");
        assert_eq!(config.model.labels[9], "Turtle_Tortoise");
        assert_eq!(config.model.allowed_extensions, vec!["png", "jpg", "jpeg"]);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            r#"
server:
  port: 8080
model:
  path: models/other.onnx
  labels: [cat, dog]
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.model.path, PathBuf::from("models/other.onnx"));
        assert_eq!(config.model.labels, vec!["cat", "dog"]);
        assert_eq!(config.model.input_size, 224);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.yaml").unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  host: 127.0.0.1\n  metrics: false").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.server.metrics);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_empty_labels_rejected() {
        let config = AppConfig::from_yaml("model:\n  labels: []\n").unwrap();
        assert!(config.validate().is_err());
    }
}
