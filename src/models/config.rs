//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream gazette API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry policy applied to every remote call
    #[serde(default)]
    pub retry: RetryConfig,

    /// Archiving behavior (throttle, concurrency, PDF policy)
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Object storage target
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from environment variables.
    ///
    /// Used by the Lambda runtime, where configuration is injected through
    /// the function environment rather than a file.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("DOF_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(secs) = var("DOF_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.api.timeout_secs = secs;
        }
        if let Some(ms) = var("RETRY_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.retry.delay_ms = ms;
        }
        if let Some(n) = var("RETRY_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.retry.max_attempts = n;
        }
        if let Some(ms) = var("REQUEST_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.archive.throttle_ms = ms;
        }
        if let Some(n) = var("MAX_CONCURRENT").and_then(|v| v.parse().ok()) {
            self.archive.max_concurrent = n;
        }
        if let Some(backend) = var("STORAGE_BACKEND") {
            match backend.to_lowercase().as_str() {
                "s3" => self.storage.backend = StorageBackend::S3,
                "local" => self.storage.backend = StorageBackend::Local,
                other => log::warn!("Ignoring unknown STORAGE_BACKEND '{}'", other),
            }
        }
        if let Some(bucket) = var("S3_BUCKET") {
            self.storage.bucket = bucket;
        }
        if let Some(prefix) = var("S3_PREFIX") {
            self.storage.prefix = prefix;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)
            .map_err(|e| AppError::validation(format!("api.base_url is invalid: {e}")))?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.archive.max_concurrent == 0 {
            return Err(AppError::validation("archive.max_concurrent must be > 0"));
        }
        if self.retry.backoff == Backoff::Exponential && self.retry.max_delay_ms < self.retry.delay_ms
        {
            return Err(AppError::validation(
                "retry.max_delay_ms must be >= retry.delay_ms",
            ));
        }
        if !(-23..=23).contains(&self.archive.utc_offset_hours) {
            return Err(AppError::validation(
                "archive.utc_offset_hours must be between -23 and 23",
            ));
        }
        if self.storage.prefix.trim_matches('/').is_empty() {
            return Err(AppError::validation("storage.prefix is empty"));
        }
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.trim().is_empty() {
            return Err(AppError::validation("storage.bucket is empty"));
        }
        Ok(())
    }
}

/// Upstream gazette API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the four endpoints hang off
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-attempt request timeout in seconds (0 disables the timeout)
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Delay growth between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    #[default]
    Fixed,
    Exponential,
}

/// Retry policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay before the first retry in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub delay_ms: u64,

    /// Maximum attempts per call; 0 retries forever
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    #[serde(default)]
    pub backoff: Backoff,

    /// Ceiling for exponential backoff in milliseconds
    #[serde(default = "defaults::max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay_ms: defaults::retry_delay(),
            max_attempts: defaults::max_attempts(),
            backoff: Backoff::default(),
            max_delay_ms: defaults::max_delay(),
        }
    }
}

/// Archiving behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Pause after each uploaded notice document, in milliseconds
    #[serde(default = "defaults::throttle")]
    pub throttle_ms: u64,

    /// Notice fetch+upload jobs in flight at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Skip issue PDFs already in storage (notices are always checked)
    #[serde(default)]
    pub skip_existing_pdfs: bool,

    /// Hours from UTC used to compute "today" for scheduled runs
    #[serde(default = "defaults::utc_offset")]
    pub utc_offset_hours: i32,
}

impl ArchiveConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            throttle_ms: defaults::throttle(),
            max_concurrent: defaults::max_concurrent(),
            skip_existing_pdfs: false,
            utc_offset_hours: defaults::utc_offset(),
        }
    }
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    S3,
}

/// Object storage target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the local backend
    #[serde(default = "defaults::local_root")]
    pub local_root: String,

    /// Bucket name for the S3 backend
    #[serde(default = "defaults::bucket")]
    pub bucket: String,

    /// Key prefix every object lives under
    #[serde(default = "defaults::prefix")]
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            local_root: defaults::local_root(),
            bucket: defaults::bucket(),
            prefix: defaults::prefix(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn base_url() -> String {
        "https://sidofqa.segob.gob.mx/dof/sidof/".to_string()
    }
    pub fn user_agent() -> String {
        concat!("dof-archiver/", env!("CARGO_PKG_VERSION")).to_string()
    }
    pub fn timeout() -> u64 {
        120
    }

    // Retry defaults
    pub fn retry_delay() -> u64 {
        3_000
    }
    pub fn max_attempts() -> u32 {
        20
    }
    pub fn max_delay() -> u64 {
        60_000
    }

    // Archive defaults
    pub fn throttle() -> u64 {
        500
    }
    pub fn max_concurrent() -> usize {
        1
    }
    pub fn utc_offset() -> i32 {
        -6
    }

    // Storage defaults
    pub fn local_root() -> String {
        "storage".to_string()
    }
    pub fn bucket() -> String {
        "dof-archive".to_string()
    }
    pub fn prefix() -> String {
        "dof".to_string()
    }}
