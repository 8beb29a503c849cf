//! Runtime settings read from the environment.
//!
//! The binary loads `.env` with `dotenvy` before calling
//! [`Settings::from_env`], so values can live in either place.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::fetch::DEFAULT_TIMEOUT;
use crate::source::DEFAULT_STORE_KEY;

pub const DEFAULT_LOG_FILE_PATH: &str = "logs/esg_scorer.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Bearer token for the data API (`ESG_API_TOKEN`).
    pub api_token: Option<String>,
    /// Key the submission array is stored under (`ESG_STORE_KEY`).
    pub store_key: String,
    /// Per-request timeout for the data API (`ESG_HTTP_TIMEOUT_SECS`).
    pub http_timeout: Duration,
    /// JSON log file location (`LOG_FILE_PATH`).
    pub log_file_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_token: None,
            store_key: DEFAULT_STORE_KEY.to_string(),
            http_timeout: DEFAULT_TIMEOUT,
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let http_timeout = match get("ESG_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("ESG_HTTP_TIMEOUT_SECS is not a number: '{raw}'"))?;
                Duration::from_secs(secs)
            }
            None => defaults.http_timeout,
        };

        Ok(Self {
            api_token: get("ESG_API_TOKEN"),
            store_key: get("ESG_STORE_KEY").unwrap_or(defaults.store_key),
            http_timeout,
            log_file_path: get("LOG_FILE_PATH").unwrap_or(defaults.log_file_path),
        })
    }
}
