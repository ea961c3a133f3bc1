use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const ENV_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_BUCKET: &str = "AWS_BUCKET_NAME";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_API_BASE_URL: &str = "OPENWEATHER_BASE_URL";
pub const ENV_S3_ENDPOINT: &str = "ARCHIVE_S3_ENDPOINT";

pub const DEFAULT_API_BASE_URL: &str = "https://api.openweathermap.org";

/// Settings shared by the weather client and the archive writer.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// bucket = "my-weather-archive"
/// region = "us-east-1"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Bucket holding archived observations.
    pub bucket: Option<String>,

    /// AWS region; falls back to the SDK's default chain when absent.
    pub region: Option<String>,

    /// Override of the weather API origin.
    pub api_base_url: Option<String>,

    /// Custom S3-compatible endpoint, addressed path-style.
    pub s3_endpoint: Option<String>,
}

impl Config {
    /// Load the config file (if any) and layer process environment on top.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Override fields with non-empty values returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = read(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = read(ENV_BUCKET) {
            self.bucket = Some(v);
        }
        if let Some(v) = read(ENV_REGION) {
            self.region = Some(v);
        }
        if let Some(v) = read(ENV_API_BASE_URL) {
            self.api_base_url = Some(v);
        }
        if let Some(v) = read(ENV_S3_ENDPOINT) {
            self.s3_endpoint = Some(v);
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: set {ENV_API_KEY} or run `weather-dashboard configure`."
            )
        })
    }

    pub fn bucket(&self) -> Result<&str> {
        self.bucket.as_deref().ok_or_else(|| {
            anyhow!(
                "No archive bucket configured.\n\
                 Hint: set {ENV_BUCKET} or run `weather-dashboard configure`."
            )
        })
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }
}
