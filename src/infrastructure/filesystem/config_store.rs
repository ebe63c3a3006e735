use crate::common::error::InvalidInput;
use crate::domain::entities::AddonConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "oa-addons.yaml";

/// Configuration store related errors
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Configuration file not found at path: {0}")]
    ConfigFileNotFound(String),

    #[error("Configuration file read failed: {0}")]
    ReadFailed(String),

    #[error("YAML parsing failed: {0}")]
    YamlParsingFailed(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(#[from] InvalidInput),
}

impl ConfigStoreError {
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Self::ConfigFileNotFound(path) => Some(PathBuf::from(path)),
            _ => None,
        }
    }
}

/// Loads the YAML configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse any YAML document
    pub fn read_config<T, P>(&self, config_path: P) -> Result<T, ConfigStoreError>
    where
        T: DeserializeOwned,
        P: AsRef<Path>,
    {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(ConfigStoreError::ConfigFileNotFound(
                path.display().to_string(),
            ));
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigStoreError::ReadFailed(e.to_string()))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigStoreError::YamlParsingFailed(format!("{}: {}", path.display(), e)))
    }

    /// Load the add-on configuration.
    ///
    /// An explicit path must exist. Without one, `oa-addons.yaml` in
    /// `search_dir` is used when present, otherwise built-in defaults.
    pub fn load_addon_config(
        &self,
        explicit_path: Option<&Path>,
        search_dir: &Path,
    ) -> Result<AddonConfig, ConfigStoreError> {
        let config = match explicit_path {
            Some(path) => self.read_config::<AddonConfig, _>(path)?,
            None => {
                let candidate = search_dir.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    self.read_config::<AddonConfig, _>(&candidate)?
                } else {
                    debug!("No {} in {}, using defaults", DEFAULT_CONFIG_FILE, search_dir.display());
                    AddonConfig::default()
                }
            }
        };

        config.validate().map_err(InvalidInput::from)?;
        Ok(config)
    }

    pub fn config_exists<P: AsRef<Path>>(&self, config_path: P) -> bool {
        config_path.as_ref().is_file()
    }
}
