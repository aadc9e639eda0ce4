//! Dashboard configuration loaded from TOML.
//!
//! # Responsibility
//! - Describe every recognized dashboard option with defaults.
//! - Load from an explicit path or standard locations.
//! - Reject inconsistent values before any source is built.
//!
//! Supports a sectioned layout:
//!
//! ```toml
//! [dashboard]
//! refresh_interval_secs = 30
//! dataset_size_cap = 1000
//! style = "spiral"
//!
//! [dashboard.remote]
//! url = "https://example.com/unicorns.json"
//! timeout_ms = 5000
//! retries = 2
//! ```
//!
//! and the same keys directly at the top level.

use crate::layout::{LayoutParams, StyleTag};
use crate::source::remote::RemoteRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DATASET_SIZE_CAP: usize = 1000;
pub const DEFAULT_SYNTHETIC_COUNT: usize = 1000;
const CONFIG_FILE_NAME: &str = "unicorn-dashboard.toml";
const SECTION_NAME: &str = "dashboard";

/// Top-level dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Seconds between automatic refreshes; `0` or absent disables them.
    pub refresh_interval_secs: Option<u64>,
    /// Upper bound on records kept per dataset.
    pub dataset_size_cap: usize,
    /// Initially selected visualization style.
    pub style: StyleTag,
    pub log_level: Option<String>,
    pub store: StoreConfig,
    pub static_file: StaticFileConfig,
    pub remote: RemoteConfig,
    pub synthetic: SyntheticConfig,
    pub layout: LayoutParams,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: None,
            dataset_size_cap: DEFAULT_DATASET_SIZE_CAP,
            style: StyleTag::default(),
            log_level: None,
            store: StoreConfig::default(),
            static_file: StaticFileConfig::default(),
            remote: RemoteConfig::default(),
            synthetic: SyntheticConfig::default(),
            layout: LayoutParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path; the store step is skipped when absent.
    pub path: Option<PathBuf>,
    /// Write a dataset that came from the static file back into the store.
    pub seed_from_static: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("unicorns.db")),
            seed_from_static: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFileConfig {
    /// Candidate snapshots, probed in order.
    pub paths: Vec<PathBuf>,
}

impl Default for StaticFileConfig {
    fn default() -> Self {
        Self {
            paths: vec![
                PathBuf::from("unicorn_data_comprehensive.json"),
                PathBuf::from("unicorn_data_large.json"),
                PathBuf::from("unicorn_data.json"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Endpoint URL; the remote step is skipped when absent.
    pub url: Option<String>,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
    pub retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            timeout_ms: 10_000,
            retries: 1,
            retry_backoff_ms: 250,
        }
    }
}

impl RemoteConfig {
    /// Builds the request description, or `None` when no URL is configured.
    pub fn to_request(&self) -> Option<RemoteRequest> {
        let url = self.url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        Some(RemoteRequest {
            url: url.to_string(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            retries: self.retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Disabling removes the guaranteed terminal fallback.
    pub enabled: bool,
    pub count: usize,
    /// Fixed generator seed; a fresh seed is drawn and recorded when absent.
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: DEFAULT_SYNTHETIC_COUNT,
            seed: Some(42),
        }
    }
}

impl DashboardConfig {
    /// Loads configuration from a TOML file (sectioned or direct layout).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let config = Self::from_toml_str(&contents)
            .map_err(|err| match err {
                ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
                other => other,
            })?;
        Ok(config)
    }

    /// Parses configuration text and validates it.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut root: toml::Table = toml::from_str(contents)
            .map_err(|err| ConfigError::Parse(PathBuf::new(), err))?;
        // A `[dashboard]` section wins over top-level keys.
        let section = root
            .remove(SECTION_NAME)
            .unwrap_or(toml::Value::Table(root));
        let config: DashboardConfig = section
            .try_into()
            .map_err(|err| ConfigError::Parse(PathBuf::new(), err))?;
        config.validate()?;
        Ok(config)
    }

    /// Searches `./unicorn-dashboard.toml` then `./config.toml`.
    ///
    /// Returns `None` when neither exists.
    pub fn find_and_load() -> Result<Option<Self>, ConfigError> {
        Self::find_and_load_in(Path::new("."))
    }

    /// Same as `find_and_load`, rooted at `dir`.
    pub fn find_and_load_in(dir: &Path) -> Result<Option<Self>, ConfigError> {
        for name in [CONFIG_FILE_NAME, "config.toml"] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Self::load(&candidate).map(Some);
            }
        }
        Ok(None)
    }

    /// Refresh interval, `None` when auto refresh is disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        match self.refresh_interval_secs {
            Some(0) | None => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        }
    }

    /// Checks cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset_size_cap == 0 {
            return Err(ConfigError::Invalid(
                "dataset_size_cap must be at least 1".to_string(),
            ));
        }
        if self.synthetic.enabled && self.synthetic.count == 0 {
            return Err(ConfigError::Invalid(
                "synthetic.count must be at least 1 when synthetic generation is enabled"
                    .to_string(),
            ));
        }
        if self.remote.url.is_some() && self.remote.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "remote.timeout_ms must be greater than 0".to_string(),
            ));
        }
        self.layout
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(())
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "failed to read config {}: {err}", path.display()),
            Self::Parse(path, err) => {
                write!(f, "failed to parse config {}: {err}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Parse(_, err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}
