use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".pyzodrc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Name of the base class that marks a class as a model.
    #[serde(default = "default_base_class")]
    pub base_class: String,

    /// Canonical module the base class must be imported from.
    #[serde(default = "default_base_module")]
    pub base_module: String,

    /// Fully qualified type names excluded from cross-module resolution.
    /// These are well-known structural types, not user models.
    #[serde(default = "default_skip_types")]
    pub skip_types: Vec<String>,

    /// Root directory that dotted module paths are resolved against.
    #[serde(default = "default_source_root")]
    pub source_root: String,
}

fn default_base_class() -> String {
    "BaseModel".to_string()
}

fn default_base_module() -> String {
    "pydantic".to_string()
}

fn default_skip_types() -> Vec<String> {
    ["uuid.UUID", "pydantic.BaseModel"]
        .map(String::from)
        .to_vec()
}

fn default_source_root() -> String {
    "./".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_class: default_base_class(),
            base_module: default_base_module(),
            skip_types: default_skip_types(),
            source_root: default_source_root(),
        }
    }
}

impl Config {
    /// True if the given fully qualified class path is a well-known
    /// structural type that must not be resolved as a user model.
    pub fn is_skipped_type(&self, fq_path: &str) -> bool {
        self.skip_types.iter().any(|t| t == fq_path)
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_class, "BaseModel");
        assert_eq!(config.base_module, "pydantic");
        assert_eq!(config.skip_types, vec!["uuid.UUID", "pydantic.BaseModel"]);
        assert!(config.is_skipped_type("uuid.UUID"));
        assert!(!config.is_skipped_type("app.models.User"));
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "baseClass": "CustomBase",
              "skipTypes": ["uuid.UUID"],
              "sourceRoot": "src"
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_class, "CustomBase");
        assert_eq!(config.base_module, "pydantic");
        assert_eq!(config.skip_types, vec!["uuid.UUID"]);
        assert_eq!(config.source_root, "src");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.base_class, "BaseModel");
        assert_eq!(config.source_root, "./");
    }
}
