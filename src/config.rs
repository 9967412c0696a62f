use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{
    errors::ConfigError,
    search::{SearchOptions, DEFAULT_THRESHOLD},
};

const CONFIG_FILE: &str = "config.yaml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Minimum partial similarity in [0.0, 1.0] for a fuzzy match
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Evaluate catalog entries on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: Option<PathBuf>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            parallel: false,
            base_path: None,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl FinderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    pub fn from_yaml_str(config_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.yaml` from `base_path`, writing the defaults first if the
    /// file does not exist yet.
    pub fn load_with(base_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base_path = base_path.as_ref();
        let path = base_path.join(CONFIG_FILE);

        // create new if does not exist
        if !path.exists() {
            log::info!("Creating default config at {}", path.display());
            std::fs::create_dir_all(base_path)?;
            std::fs::write(&path, serde_yml::to_string(&Self::default())?)?;
        }

        let config_str = String::from_utf8(std::fs::read(&path)?)?;
        let mut config = Self::from_yaml_str(&config_str)?;
        config.base_path = Some(base_path.to_path_buf());

        // resave in case new fields were added since the file was written
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    /// Write the config back to where it was loaded from. A config that was
    /// never loaded from disk has nowhere to go and is left alone.
    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(base_path) = &self.base_path else {
            return Ok(());
        };
        let config_str = serde_yml::to_string(self)?;
        std::fs::write(base_path.join(CONFIG_FILE), config_str)?;
        Ok(())
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            threshold: self.threshold,
            parallel: self.parallel,
        }
    }
}
