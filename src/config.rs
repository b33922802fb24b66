//! # Bot Configuration Module
//!
//! This module defines configuration structures for the bot, loaded from
//! environment variables at startup and validated before the dispatcher runs.

use anyhow::{bail, Context, Result};

// Constants for bot configuration
pub const DEFAULT_LISTINGS_SHEET: &str = "Listings";
pub const DEFAULT_REQUESTS_SHEET: &str = "Requests";
pub const DEFAULT_DATABASE_PATH: &str = "user_actions.db";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300; // 5 minutes
pub const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

// Validation limits shared across the crate
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_COMMENT_LENGTH: usize = 1000;
pub const MAX_LISTING_PRICE: f64 = 1_000_000_000.0;
pub const SUPPORTED_IMAGE_FORMATS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Retry configuration for spreadsheet calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000, // 1 second
            max_retry_delay_ms: 10000, // 10 seconds
        }
    }
}

/// Settings for the Google Sheets backend
#[derive(Debug, Clone)]
pub struct SheetsSettings {
    /// Spreadsheet document identifier
    pub spreadsheet_id: String,
    /// Bearer token used for API calls
    pub api_token: String,
    /// Name of the read-only listings sheet
    pub listings_sheet: String,
    /// Name of the append-only requests sheet
    pub requests_sheet: String,
    /// API base URL, overridable for tests
    pub base_url: String,
}

/// Top-level bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token
    pub bot_token: String,
    /// Chat IDs with admin access; the first one receives notifications
    pub admin_ids: Vec<i64>,
    /// Google Sheets settings
    pub sheets: SheetsSettings,
    /// Path to the SQLite action log
    pub database_path: String,
    /// Listing cache time-to-live in seconds
    pub cache_ttl_secs: u64,
    /// Retry settings for spreadsheet calls
    pub retry: RetryConfig,
}

impl BotConfig {
    /// Load and validate configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?;
        let spreadsheet_id =
            std::env::var("SPREADSHEET_ID").context("SPREADSHEET_ID must be set")?;
        let api_token =
            std::env::var("SHEETS_API_TOKEN").context("SHEETS_API_TOKEN must be set")?;

        let admin_ids = match std::env::var("ADMIN_ID") {
            Ok(raw) => parse_admin_ids(&raw)?,
            Err(_) => Vec::new(),
        };

        let cache_ttl_secs = match std::env::var("CACHE_TTL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("CACHE_TTL_SECS must be an integer number of seconds")?,
            Err(_) => DEFAULT_CACHE_TTL_SECS,
        };

        let config = Self {
            bot_token,
            admin_ids,
            sheets: SheetsSettings {
                spreadsheet_id,
                api_token,
                listings_sheet: std::env::var("LISTINGS_SHEET_NAME")
                    .unwrap_or_else(|_| DEFAULT_LISTINGS_SHEET.to_string()),
                requests_sheet: std::env::var("REQUESTS_SHEET_NAME")
                    .unwrap_or_else(|_| DEFAULT_REQUESTS_SHEET.to_string()),
                base_url: SHEETS_API_BASE_URL.to_string(),
            },
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
            cache_ttl_secs,
            retry: RetryConfig::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that must hold before the dispatcher starts
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            bail!("BOT_TOKEN is empty");
        }
        if self.sheets.spreadsheet_id.trim().is_empty() {
            bail!("SPREADSHEET_ID is empty");
        }
        if self.cache_ttl_secs == 0 {
            bail!("CACHE_TTL_SECS must be positive");
        }
        if self.admin_ids.is_empty() {
            tracing::warn!("no ADMIN_ID configured, admin features will be unavailable");
        }
        Ok(())
    }

    /// Whether the given Telegram user has admin access
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// The chat that receives request notifications, if any admin is set
    pub fn notification_chat(&self) -> Option<i64> {
        self.admin_ids.first().copied()
    }
}

/// Parse a comma-separated list of admin chat IDs
fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .with_context(|| format!("ADMIN_ID entry is not a number: {part}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> BotConfig {
        BotConfig {
            bot_token: "token".to_string(),
            admin_ids: vec![100, 200],
            sheets: SheetsSettings {
                spreadsheet_id: "sheet-id".to_string(),
                api_token: "api-token".to_string(),
                listings_sheet: DEFAULT_LISTINGS_SHEET.to_string(),
                requests_sheet: DEFAULT_REQUESTS_SHEET.to_string(),
                base_url: SHEETS_API_BASE_URL.to_string(),
            },
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            retry: RetryConfig::default(),
        }
    }

    #[test]
    fn test_parse_admin_ids() {
        assert_eq!(parse_admin_ids("123").unwrap(), vec![123]);
        assert_eq!(parse_admin_ids("1, 2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_admin_ids("").unwrap(), Vec::<i64>::new());
        assert!(parse_admin_ids("12,abc").is_err());
    }

    #[test]
    fn test_is_admin() {
        let config = sample_config();
        assert!(config.is_admin(100));
        assert!(config.is_admin(200));
        assert!(!config.is_admin(300));
    }

    #[test]
    fn test_notification_chat_is_first_admin() {
        let config = sample_config();
        assert_eq!(config.notification_chat(), Some(100));

        let mut config = config;
        config.admin_ids.clear();
        assert_eq!(config.notification_chat(), None);
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut config = sample_config();
        config.bot_token = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.sheets.spreadsheet_id = String::new();
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.cache_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_defaults_reasonable() {
        let retry = RetryConfig::default();
        assert!(retry.max_retries <= 10);
        assert!(retry.base_retry_delay_ms >= 100);
        assert!(retry.max_retry_delay_ms >= retry.base_retry_delay_ms);
    }
}
