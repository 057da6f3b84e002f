//! `~/.syncspace/config.toml` loading and resolution.
//!
//! Every section is optional. [`SyncSpaceConfig::settings`] fills in defaults,
//! expands `${VAR}` references and validates endpoint URLs.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use syncspace_nav::{LayoutMode, SuppressionRelease, SynchronizerOptions};
use thiserror::Error;
use url::Url;

pub const DEFAULT_QUOTE_URL: &str = "https://dummyjson.com/quotes/random";
pub const DEFAULT_NEWS_URL: &str =
    "https://gnews.io/api/v4/top-headlines?category=technology&lang=en&country=us&max=10";

const DEFAULT_QUOTE_MAX_AGE_MINUTES: u64 = 2;
const DEFAULT_NEWS_MAX_AGE_MINUTES: u64 = 30;
const DEFAULT_QUOTE_REFRESH_SECONDS: u64 = 120;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_SUPPRESSION_MS: u64 = 1000;
const DEFAULT_DEBOUNCE_MS: u64 = 100;
const DEFAULT_SETTLE_QUIET_MS: u64 = 150;

#[derive(Debug, Default, Deserialize)]
pub struct SyncSpaceConfig {
    pub storage: Option<StorageConfig>,
    pub cache: Option<CacheConfig>,
    pub endpoints: Option<EndpointsConfig>,
    pub navigation: Option<NavigationConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid {field} {value:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::InvalidUrl { .. } | ConfigError::ZeroDuration { .. } => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// Directory for the file-backed store. Default: `~/.syncspace/store`.
    pub dir: Option<String>,
    /// Writes that would grow the store past this many bytes fail.
    pub max_bytes: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CacheConfig {
    pub quote_max_age_minutes: Option<u64>,
    pub news_max_age_minutes: Option<u64>,
    pub quote_refresh_seconds: Option<u64>,
    /// Share one in-flight fetch between concurrent misses on a key.
    #[serde(default)]
    pub single_flight: bool,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Default, Deserialize)]
pub struct EndpointsConfig {
    pub quote_url: Option<String>,
    pub news_url: Option<String>,
    pub news_api_key: Option<String>,
}

// Keep the news key out of logs.
impl std::fmt::Debug for EndpointsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointsConfig")
            .field("quote_url", &self.quote_url)
            .field("news_url", &self.news_url)
            .field("news_api_key", &mask(self.news_api_key.as_deref()))
            .finish()
    }
}

fn mask(opt: Option<&str>) -> &'static str {
    if opt.is_some() { "[REDACTED]" } else { "None" }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseMode {
    #[default]
    Timeout,
    Settle,
}

#[derive(Debug, Default, Deserialize)]
pub struct NavigationConfig {
    pub layout: Option<LayoutMode>,
    /// Timeout mode: the whole window. Settle mode: the upper bound.
    pub suppression_ms: Option<u64>,
    pub debounce_ms: Option<u64>,
    pub release: Option<ReleaseMode>,
    pub settle_quiet_ms: Option<u64>,
}

impl NavigationConfig {
    #[must_use]
    pub fn options(&self) -> SynchronizerOptions {
        let window =
            Duration::from_millis(self.suppression_ms.unwrap_or(DEFAULT_SUPPRESSION_MS));
        let release = match self.release.unwrap_or_default() {
            ReleaseMode::Timeout => SuppressionRelease::Timeout(window),
            ReleaseMode::Settle => SuppressionRelease::Settle {
                quiet: Duration::from_millis(
                    self.settle_quiet_ms.unwrap_or(DEFAULT_SETTLE_QUIET_MS),
                ),
                max: window,
            },
        };
        SynchronizerOptions {
            layout: self.layout.unwrap_or_default(),
            release,
            debounce: Duration::from_millis(self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)),
        }
    }
}

/// Fully resolved configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_dir: PathBuf,
    pub max_bytes: Option<u64>,
    pub quote_max_age: Duration,
    pub news_max_age: Duration,
    pub quote_refresh: Duration,
    pub single_flight: bool,
    pub request_timeout: Duration,
    pub quote_url: Url,
    /// Without the API key; see [`Settings::news_request_url`].
    pub news_url: Url,
    pub news_api_key: Option<String>,
    pub navigation: SynchronizerOptions,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("store_dir", &self.store_dir)
            .field("max_bytes", &self.max_bytes)
            .field("quote_max_age", &self.quote_max_age)
            .field("news_max_age", &self.news_max_age)
            .field("quote_refresh", &self.quote_refresh)
            .field("single_flight", &self.single_flight)
            .field("request_timeout", &self.request_timeout)
            .field("quote_url", &self.quote_url.as_str())
            .field("news_url", &self.news_url.as_str())
            .field("news_api_key", &mask(self.news_api_key.as_deref()))
            .field("navigation", &self.navigation)
            .finish()
    }
}

impl Settings {
    /// The news URL with `apikey` set when a key is configured.
    #[must_use]
    pub fn news_request_url(&self) -> Url {
        let mut url = self.news_url.clone();
        if let Some(key) = &self.news_api_key {
            let retained: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(name, _)| name != "apikey")
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(retained)
                .append_pair("apikey", key);
        }
        url
    }
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_url(field: &'static str, raw: Option<&str>, default: &str) -> Result<Url, ConfigError> {
    let value = raw.map_or_else(|| default.to_string(), expand_env_vars);
    Url::parse(&value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value,
        source,
    })
}

impl SyncSpaceConfig {
    /// `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let storage = self.storage.as_ref();
        let cache = self.cache.as_ref();
        let endpoints = self.endpoints.as_ref();

        let store_dir = storage
            .and_then(|s| s.dir.as_deref())
            .map(|dir| PathBuf::from(expand_env_vars(dir)))
            .unwrap_or_else(default_store_dir);

        let minutes = |get: fn(&CacheConfig) -> Option<u64>, default: u64| {
            Duration::from_secs(cache.and_then(get).unwrap_or(default).saturating_mul(60))
        };
        let positive_seconds =
            |field: &'static str, get: fn(&CacheConfig) -> Option<u64>, default: u64| {
                match cache.and_then(get).unwrap_or(default) {
                    0 => Err(ConfigError::ZeroDuration { field }),
                    secs => Ok(Duration::from_secs(secs)),
                }
            };

        let news_api_key = endpoints
            .and_then(|e| e.news_api_key.as_deref())
            .map(expand_env_vars)
            .filter(|key| !key.trim().is_empty());

        Ok(Settings {
            store_dir,
            max_bytes: storage.and_then(|s| s.max_bytes),
            quote_max_age: minutes(|c| c.quote_max_age_minutes, DEFAULT_QUOTE_MAX_AGE_MINUTES),
            news_max_age: minutes(|c| c.news_max_age_minutes, DEFAULT_NEWS_MAX_AGE_MINUTES),
            quote_refresh: positive_seconds(
                "cache.quote_refresh_seconds",
                |c| c.quote_refresh_seconds,
                DEFAULT_QUOTE_REFRESH_SECONDS,
            )?,
            single_flight: cache.is_some_and(|c| c.single_flight),
            request_timeout: positive_seconds(
                "cache.request_timeout_seconds",
                |c| c.request_timeout_seconds,
                DEFAULT_REQUEST_TIMEOUT_SECONDS,
            )?,
            quote_url: parse_url(
                "endpoints.quote_url",
                endpoints.and_then(|e| e.quote_url.as_deref()),
                DEFAULT_QUOTE_URL,
            )?,
            news_url: parse_url(
                "endpoints.news_url",
                endpoints.and_then(|e| e.news_url.as_deref()),
                DEFAULT_NEWS_URL,
            )?,
            news_api_key,
            navigation: self
                .navigation
                .as_ref()
                .map(NavigationConfig::options)
                .unwrap_or_else(|| NavigationConfig::default().options()),
        })
    }
}

/// `~/.syncspace`, if a home directory is known.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".syncspace"))
}

pub fn config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn default_store_dir() -> PathBuf {
    data_dir()
        .unwrap_or_else(|| PathBuf::from(".syncspace"))
        .join("store")
}
