//! Preference store: the persisted credential plus user preferences.
//!
//! The record is a small TOML file in the platform config directory
//! (`~/.config/genie-cli/config.toml` on Linux). `GENIE_CONFIG_DIR` moves it,
//! and `GEMINI_API_KEY` supplies a credential for the current process without
//! ever being written back.

use crate::error::{GenieError, GenieResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const APP_DIR: &str = "genie-cli";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default = "default_true")]
    pub color_output: bool,
    #[serde(default)]
    pub verbose_mode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            color_output: true,
            verbose_mode: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub user_preferences: UserPreferences,
    /// Credential taken from the environment for this process only.
    #[serde(skip)]
    env_api_key: Option<String>,
    #[serde(skip)]
    use_mock: bool,
}

impl Config {
    /// Applies `GEMINI_API_KEY` and `GENIE_USE_MOCK`.
    fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = env::var("GEMINI_API_KEY") {
            if !api_key.trim().is_empty() {
                debug!("Using Gemini API key from environment");
                self.env_api_key = Some(api_key.trim().to_string());
            }
        }

        if env::var("GENIE_USE_MOCK").is_ok() {
            self.use_mock = true;
        }
    }

    /// The credential in effect: environment first, then the stored one.
    pub fn api_key(&self) -> Option<&str> {
        self.env_api_key
            .as_deref()
            .or(self.gemini_api_key.as_deref())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.gemini_api_key = Some(api_key);
    }

    pub fn is_mock_mode(&self) -> bool {
        self.use_mock
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.user_preferences
    }

    /// Sets a preference by its persisted name (`colorOutput`, `verboseMode`).
    pub fn set_preference(&mut self, name: &str, value: bool) -> GenieResult<()> {
        match name {
            "colorOutput" => self.user_preferences.color_output = value,
            "verboseMode" => self.user_preferences.verbose_mode = value,
            other => {
                return Err(GenieError::UserInput(format!(
                    "Unknown preference '{}'. Available: colorOutput, verboseMode",
                    other
                )));
            }
        }
        Ok(())
    }
}

/// Shows the first and last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}

/// Reads and writes the [`Config`] record at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform-conventional location, honouring `GENIE_CONFIG_DIR`.
    pub fn default_location() -> GenieResult<Self> {
        let dir = match env::var("GENIE_CONFIG_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| GenieError::Config("Could not find config directory".to_string()))?
                .join(APP_DIR),
        };
        Ok(Self::new(dir.join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record, falling back to defaults, then applies environment overrides.
    pub fn load(&self) -> Config {
        let mut config = match self.load_from_file() {
            Ok(Some(config)) => config,
            Ok(None) => {
                info!("No config file found, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable config at {}: {}", self.path.display(), e);
                Config::default()
            }
        };
        config.apply_env_overrides();
        config
    }

    /// Loads only what is on disk, without environment overrides.
    pub fn load_from_file(&self) -> GenieResult<Option<Config>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| GenieError::io(format!("Failed to read {}", self.path.display()), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| GenieError::Config(e.to_string()))?;
        info!("Loaded config from: {}", self.path.display());
        Ok(Some(config))
    }

    pub fn save(&self, config: &Config) -> GenieResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GenieError::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }

        let content =
            toml::to_string_pretty(config).map_err(|e| GenieError::Config(e.to_string()))?;
        fs::write(&self.path, content)
            .map_err(|e| GenieError::io(format!("Failed to write {}", self.path.display()), e))?;
        info!("Saved config to: {}", self.path.display());
        Ok(())
    }
}
