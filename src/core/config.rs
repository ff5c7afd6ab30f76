use anyhow::{Context, Result, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.privatbank.ua";
pub const MAX_DAYS: u32 = 10;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// What to do when the rates of some day cannot be shown.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole run, print nothing
    #[default]
    Abort,
    /// Print the table with placeholder rows for the failed days
    Partial,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_headers")]
    pub headers: Vec<String>,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            headers: default_headers(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_headers() -> Vec<String> {
    ["Дата", "USD Купівля", "USD Продаж", "EUR Купівля", "EUR Продаж"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

fn default_placeholder() -> String {
    "N/A".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub on_error: FailurePolicy,
    #[serde(default)]
    pub table: TableConfig,
}

impl AppConfig {
    /// Loads the config at `path`, or the default location when `path` is `None`.
    ///
    /// A missing file at the default location yields the built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("ua", "pbrates", "pbrates")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.table.headers.len() == 5,
            "Expected 5 table headers, found {}",
            self.table.headers.len()
        );
        ensure!(
            self.provider.timeout_secs > 0,
            "Request timeout must be at least one second"
        );
        Ok(())
    }
}
