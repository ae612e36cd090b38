// src/config.rs
//
// Application configuration
//
// Resolution order (later wins):
// 1. Built-in defaults
// 2. Optional JSON file
// 3. MOVIETIME_* environment variables

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::db::get_database_path;
use crate::error::{AppError, AppResult};
use crate::services::PageLimits;

pub const ENV_TMDB_API_KEY: &str = "MOVIETIME_TMDB_API_KEY";
pub const ENV_TMDB_LANGUAGE: &str = "MOVIETIME_TMDB_LANGUAGE";
pub const ENV_TMDB_REGION: &str = "MOVIETIME_TMDB_REGION";
pub const ENV_SERPAPI_API_KEY: &str = "MOVIETIME_SERPAPI_API_KEY";
pub const ENV_DATABASE_PATH: &str = "MOVIETIME_DATABASE_PATH";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "MOVIETIME_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tmdb: TmdbConfig,
    pub showtimes: ShowtimeConfig,
    pub pagination: PageLimits,
    pub storage: StorageConfig,
    pub http: HttpConfig,
}

/// Movie metadata provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub api_base: String,
    /// Root of poster and backdrop URLs; a size segment is appended
    pub image_base: String,
    pub api_key: String,
    pub language: String,
    /// ISO 3166-1 code applied to the curated lists
    pub region: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.themoviedb.org".to_string(),
            image_base: "https://image.tmdb.org/t/p".to_string(),
            api_key: String::new(),
            language: "en-US".to_string(),
            region: None,
        }
    }
}

/// Showtime search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowtimeConfig {
    pub api_base: String,
    pub api_key: String,
    pub language: String,
}

impl Default for ShowtimeConfig {
    fn default() -> Self {
        Self {
            api_base: "https://serpapi.com".to_string(),
            api_key: String::new(),
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Defaults to {APP_DATA}/movietime/movietime.db
    pub database_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn database_path(&self) -> AppResult<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => get_database_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply MOVIETIME_* overrides looked up through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_TMDB_API_KEY) {
            self.tmdb.api_key = key;
        }
        if let Some(language) = lookup(ENV_TMDB_LANGUAGE) {
            self.tmdb.language = language;
        }
        if let Some(region) = lookup(ENV_TMDB_REGION) {
            self.tmdb.region = Some(region).filter(|region| !region.is_empty());
        }
        if let Some(key) = lookup(ENV_SERPAPI_API_KEY) {
            self.showtimes.api_key = key;
        }
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            self.storage.database_path = Some(PathBuf::from(path));
        }
        if let Some(timeout) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.http.timeout_secs = timeout.parse().map_err(|_| {
                AppError::Config(format!("{} must be a number of seconds, got {:?}", ENV_HTTP_TIMEOUT_SECS, timeout))
            })?;
        }
        Ok(())
    }
}
