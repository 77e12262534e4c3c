//! Configuration management
//!
//! Settings live in `settings.json` in the client data directory:
//! ```json
//! {
//!   "apiUrl": "http://localhost:8081",
//!   "requestTimeoutSecs": 30,
//!   "notificationDurationMs": 3000,
//!   "extractPageSize": 10,
//!   "historyFetchSize": 100,
//!   "recentTransactions": 5,
//!   "accountType": "CHECKING"
//! }
//! ```
//! Missing keys take their defaults. Keys this crate does not know are kept
//! when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::http::{API_URL_ENV, DEFAULT_API_URL};
use crate::services::account_creation::DEFAULT_ACCOUNT_TYPE;
use crate::services::dashboard::DEFAULT_RECENT_TRANSACTIONS;
use crate::services::extract::{DEFAULT_FETCH_SIZE, DEFAULT_PAGE_SIZE};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Environment variable overriding the request timeout
pub const TIMEOUT_ENV: &str = "CAPBANK_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_NOTIFICATION_MS: u64 = 3000;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notification_duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extract_page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    history_fetch_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recent_transactions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_type: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl SettingsFile {
    fn read(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE_NAME);
        if !settings_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&settings_path)
            .with_context(|| format!("Failed to read {}", settings_path.display()))?;
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub notification_duration_ms: u64,
    pub extract_page_size: usize,
    pub history_fetch_size: u32,
    pub recent_transactions: u32,
    pub account_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            notification_duration_ms: DEFAULT_NOTIFICATION_MS,
            extract_page_size: DEFAULT_PAGE_SIZE,
            history_fetch_size: DEFAULT_FETCH_SIZE,
            recent_transactions: DEFAULT_RECENT_TRANSACTIONS,
            account_type: DEFAULT_ACCOUNT_TYPE.to_string(),
        }
    }
}

impl Config {
    /// Load config from the data directory.
    ///
    /// `CAPBANK_API_URL` and `CAPBANK_TIMEOUT_SECS` win over the file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = SettingsFile::read(data_dir)?;
        let defaults = Self::default();

        let api_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or(raw.api_url)
            .unwrap_or(defaults.api_url);

        let request_timeout_secs = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .or(raw.request_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults.request_timeout_secs);

        Ok(Self {
            api_url,
            request_timeout_secs,
            notification_duration_ms: raw
                .notification_duration_ms
                .unwrap_or(defaults.notification_duration_ms),
            extract_page_size: raw
                .extract_page_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.extract_page_size),
            history_fetch_size: raw
                .history_fetch_size
                .map(|size| size.clamp(1, DEFAULT_FETCH_SIZE))
                .unwrap_or(defaults.history_fetch_size),
            recent_transactions: raw
                .recent_transactions
                .filter(|n| *n > 0)
                .unwrap_or(defaults.recent_transactions),
            account_type: raw.account_type.unwrap_or(defaults.account_type),
        })
    }

    /// Save to the data directory, keeping keys we don't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = SettingsFile::read(data_dir)?;

        settings.api_url = Some(self.api_url.clone());
        settings.request_timeout_secs = Some(self.request_timeout_secs);
        settings.notification_duration_ms = Some(self.notification_duration_ms);
        settings.extract_page_size = Some(self.extract_page_size);
        settings.history_fetch_size = Some(self.history_fetch_size);
        settings.recent_transactions = Some(self.recent_transactions);
        settings.account_type = Some(self.account_type.clone());

        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE_NAME), content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }
}
