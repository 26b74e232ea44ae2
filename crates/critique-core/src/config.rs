use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::prompt::DEFAULT_MODEL;

pub const DEFAULT_SECRETS_FILE: &str = "secrets.json";

/// Optional user settings, stored at `<config dir>/critique/config.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Settings are optional, so a platform without a config dir just gets defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_in(dirs::config_dir())
    }

    fn load_in(config_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        match config_dir {
            Some(dir) => Self::load_from(&Self::path_in(&dir)),
            None => Ok(Self::default()),
        }
    }

    /// A missing file means defaults; a file that exists but doesn't parse is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&config_content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let config_content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, config_content).map_err(write_err)
    }

    pub fn save_default_model(model: &str) -> Result<(), ConfigError> {
        Self::save_model_to(&Self::get_config_path()?, model)
    }

    /// Update only `model`. An unreadable file is reported, never overwritten.
    pub fn save_model_to(path: &Path, model: &str) -> Result<(), ConfigError> {
        let mut config = Self::load_from(path)?;
        config.model = Some(model.to_string());
        config.save_to(path)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::path_in(&config_dir))
    }

    fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join("critique").join("config.json")
    }
}

/// Credentials read once at startup. Unlike `Config`, every problem here is fatal.
#[derive(Deserialize, Clone)]
pub struct Secrets {
    openai_api_key: Option<String>,
}

impl Secrets {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::SecretsMissing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let secrets: Secrets = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        match secrets.openai_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(secrets),
            _ => Err(ConfigError::MissingApiKey(path.to_path_buf())),
        }
    }

    pub fn openai_api_key(&self) -> &str {
        self.openai_api_key.as_deref().unwrap_or_default().trim()
    }
}

// Keep the key out of logs and panic messages.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets").field("openai_api_key", &"<redacted>").finish()
    }
}
