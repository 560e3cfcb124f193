use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const API_URL_ENV: &str = "INVOICE_DESK_API_URL";

const SETTINGS_FILE: &str = "settings.toml";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Base URL of the invoice REST API, e.g. `http://localhost:8080/api/v1`.
    pub api_base_url: String,
    /// Identity endpoint used for email/password sign-in.
    pub auth_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/v1".into(),
            auth_url: "https://identitytoolkit.googleapis.com/v1".into(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl AppSettings {
    /// Reads `settings.toml` from `dir`, writing the defaults first if it is missing.
    pub fn load_or_init(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            tracing::info!(path = %path.display(), "initializing default settings");
            let settings = AppSettings::default();
            settings.save(dir)?;
            return Ok(settings);
        }
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(dir)?;
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(dir.join(SETTINGS_FILE), toml_str)?;
        Ok(())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        self
    }
}

pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("com", "invoice-desk", "app").ok_or(ConfigError::NoConfigDir)?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Where the signed-in session marker lives.
pub fn session_path(dir: &Path) -> PathBuf {
    dir.join(SESSION_FILE)
}
