use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::config::EngineConfig;

pub const DEFAULT_CONFIG_FILE: &str = "huffpack.toml";
pub const DEFAULT_LOG_FILTER: &str = "huffpack=info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_filter: String,
    /// Delete the output file when decoding fails part way
    pub remove_partial_output: bool,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            remove_partial_output: true,
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads `config_path`, or `huffpack.toml` when none is given. Only an
    /// explicitly named file is required to exist.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config_file = config_path.unwrap_or(DEFAULT_CONFIG_FILE);

        if Path::new(config_file).exists() {
            let content = std::fs::read_to_string(config_file)
                .with_context(|| format!("Failed to read config {}", config_file))?;
            let config: AppConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config {}", config_file))?;
            Ok(config)
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", config_file)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, config_path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huffpack.toml");

        let mut config = AppConfig::default();
        config.log_filter = "huffpack=debug".to_string();
        config.engine.read_chunk_size = 4096;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(path.to_str()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "remove_partial_output = false\n").unwrap();

        let loaded = AppConfig::load(path.to_str()).unwrap();
        assert!(!loaded.remove_partial_output);
        assert_eq!(loaded.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(loaded.engine, EngineConfig::default());
    }

    #[test]
    fn missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(AppConfig::load(path.to_str()).is_err());
    }
}
