use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_DIR: &str = "extracao_farmacia";
pub const DEFAULT_STATE_FILE: &str = "processed_place_ids.json";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Search keywords, each combined with every neighborhood.
pub const KEYWORDS: [&str; 4] = ["farmácia", "drogaria", "drugstore", "farmácia de manipulação"];

/// Application configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    pub google_api_key: String,
    pub custom_search_engine_id: Option<String>,
    pub output_dir: PathBuf,
    pub state_file: PathBuf,
    pub log_dir: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("google_api_key", &"[REDACTED]")
            .field("custom_search_engine_id", &self.custom_search_engine_id)
            .field("output_dir", &self.output_dir)
            .field("state_file", &self.state_file)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            google_api_key: get("GOOGLE_API_KEY").context("GOOGLE_API_KEY must be set")?,
            custom_search_engine_id: get("CUSTOM_SEARCH_ENGINE_ID"),
            output_dir: get("COLLECTOR_OUTPUT_DIR")
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
                .into(),
            state_file: get("COLLECTOR_STATE_FILE")
                .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string())
                .into(),
            log_dir: get("COLLECTOR_LOG_DIR")
                .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())
                .into(),
        })
    }

    /// Log directory without requiring credentials, so logging can start
    /// before the rest of the config is validated.
    pub fn log_dir_from_env() -> PathBuf {
        path_from_env("COLLECTOR_LOG_DIR", DEFAULT_LOG_DIR)
    }

    /// Extract directory without requiring credentials (read-only commands).
    pub fn output_dir_from_env() -> PathBuf {
        path_from_env("COLLECTOR_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)
    }
}

fn path_from_env(key: &str, default: &str) -> PathBuf {
    let _ = dotenv();
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
        .into()
}

/// Fixed tuning constants for a run.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Max requests in flight across all stages.
    pub concurrency: usize,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub request_timeout: Duration,
    /// Upstream needs a pause before a page token becomes valid.
    pub pagination_delay: Duration,
    pub social_results: usize,
    pub keywords: Vec<String>,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            concurrency: 20,
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
            pagination_delay: Duration::from_secs(2),
            social_results: 5,
            keywords: KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl CollectorSettings {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_pagination_delay(mut self, delay: Duration) -> Self {
        self.pagination_delay = delay;
        self
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }
}
