//! # Configuration
//!
//! Settings for the neighbor service and the crawl, resolved in layers
//! (lowest precedence first):
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <path>`, or `levelcrawl.toml` when present)
//! 3. Environment variables
//! 4. Command-line flags
//!
//! ## Environment Variables
//!
//! - `LEVELCRAWL_URL`: neighbor service base URL
//! - `LEVELCRAWL_MAX_CONCURRENCY`: in-flight expansions per depth (0 = unbounded)
//! - `LEVELCRAWL_RATE_LIMIT`: outbound requests per second (0 = unlimited)

use levelcrawl_core::{CrawlConfig, CrawlError, FailurePolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default neighbor service base URL.
pub const DEFAULT_SERVICE_URL: &str = "http://hollywood-graph-crawler.bridgesuncc.org/neighbors/";

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "levelcrawl.toml";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SETTINGS
// =============================================================================

/// Effective application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL; the escaped vertex name is appended as the last path segment.
    pub service_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Per-request timeout in milliseconds (0 = none).
    pub timeout_ms: u64,
    /// Extra attempts after a transport failure.
    pub retries: u32,
    /// Backoff step between attempts, multiplied by the attempt number.
    pub retry_backoff_ms: u64,
    /// Outbound requests per second across all tasks (0 = unlimited).
    pub rate_limit: u32,
    /// In-flight expansions per depth (0 = one task per vertex).
    pub max_concurrency: usize,
    /// Stop the crawl when every expansion of a depth fails.
    pub abort_on_dead_depth: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            user_agent: format!("levelcrawl/{}", env!("CARGO_PKG_VERSION")),
            timeout_ms: 10_000,
            retries: 0,
            retry_backoff_ms: 200,
            rate_limit: 0,
            max_concurrency: 0,
            abort_on_dead_depth: false,
        }
    }
}

/// Command-line values that take precedence over every other layer.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub service_url: Option<String>,
    pub max_concurrency: Option<usize>,
    pub rate_limit: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
    pub abort_on_dead_depth: Option<bool>,
}

impl Settings {
    /// Parse settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, CrawlError> {
        toml::from_str(text).map_err(|e| CrawlError::Config(format!("Invalid config: {}", e)))
    }

    /// Load the file layer.
    ///
    /// An explicit `path` must exist. Without one, `levelcrawl.toml` in the
    /// working directory is used if present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, CrawlError> {
        match path {
            Some(path) => Self::read_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    tracing::debug!("Using config file {}", DEFAULT_CONFIG_FILE);
                    Self::read_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read_file(path: &Path) -> Result<Self, CrawlError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            CrawlError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(CrawlError::Config(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            CrawlError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply the environment layer from the process environment.
    pub fn with_env(self) -> Result<Self, CrawlError> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply the environment layer from an arbitrary lookup.
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self, CrawlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LEVELCRAWL_URL").filter(|v| !v.is_empty()) {
            self.service_url = url;
        }
        if let Some(value) = lookup("LEVELCRAWL_MAX_CONCURRENCY") {
            self.max_concurrency = parse_env("LEVELCRAWL_MAX_CONCURRENCY", &value)?;
        }
        if let Some(value) = lookup("LEVELCRAWL_RATE_LIMIT") {
            self.rate_limit = parse_env("LEVELCRAWL_RATE_LIMIT", &value)?;
        }
        Ok(self)
    }

    /// Apply the command-line layer.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &SettingsOverrides) -> Self {
        if let Some(url) = &overrides.service_url {
            self.service_url.clone_from(url);
        }
        if let Some(n) = overrides.max_concurrency {
            self.max_concurrency = n;
        }
        if let Some(rps) = overrides.rate_limit {
            self.rate_limit = rps;
        }
        if let Some(ms) = overrides.timeout_ms {
            self.timeout_ms = ms;
        }
        if let Some(retries) = overrides.retries {
            self.retries = retries;
        }
        if let Some(abort) = overrides.abort_on_dead_depth {
            self.abort_on_dead_depth = abort;
        }
        self
    }

    /// Parse and check `service_url`.
    pub fn service_url(&self) -> Result<Url, CrawlError> {
        let url = Url::parse(&self.service_url).map_err(|e| {
            CrawlError::Config(format!("Invalid service URL '{}': {}", self.service_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CrawlError::Config(format!(
                "Service URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(CrawlError::Config(format!(
                "Service URL '{}' cannot take a path",
                self.service_url
            )));
        }
        Ok(url)
    }

    /// Orchestrator settings derived from these settings.
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            max_concurrency: self.max_concurrency,
            failure_policy: if self.abort_on_dead_depth {
                FailurePolicy::AbortOnDeadDepth
            } else {
                FailurePolicy::Continue
            },
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CrawlError> {
    value.trim().parse().map_err(|_| {
        CrawlError::Config(format!(
            "{} must be a non-negative integer, got '{}'",
            key, value
        ))
    })
}

// =============================================================================
// TESTS
// =============================================================================
