use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::url::normalize_base_url;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const DEFAULT_TYPING_DELAY_MS: u64 = 500;

/// Optional on-disk settings. The persona is intentionally not configurable.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: Option<String>,
    /// Pause before each request while the processing indicator is shown.
    pub typing_delay_ms: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        match Self::config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "matrix-chat", "matrix-chat")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Environment override first, then the file, then the public endpoint.
    pub fn resolve_base_url(&self, env_override: Option<String>) -> String {
        let chosen = env_override
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        normalize_base_url(chosen.trim())
    }

    pub fn base_url_from_env(&self) -> String {
        self.resolve_base_url(std::env::var(BASE_URL_ENV).ok())
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms.unwrap_or(DEFAULT_TYPING_DELAY_MS))
    }
}
