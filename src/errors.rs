//! # Bot Error Types Module
//!
//! This module defines the error kinds used throughout the bot.
//! Every conversation step maps a failure to one of these kinds so the
//! handler boundary can pick the right user-facing message.

/// Error kinds surfaced by conversation steps and services
#[derive(Debug, Clone)]
pub enum BotError {
    /// Bad user input, recovered locally by re-prompting
    Validation(String),
    /// Spreadsheet or network failure, surfaced as a retry-later message
    Service(String),
    /// A listing or filter combination yielded nothing
    NotFound(String),
}

impl BotError {
    /// Localization key for the user-facing message of this error kind
    pub fn user_message_key(&self) -> &'static str {
        match self {
            BotError::Validation(_) => "error-validation",
            BotError::Service(_) => "error-service",
            BotError::NotFound(_) => "error-not-found",
        }
    }
}

impl std::fmt::Display for BotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotError::Validation(msg) => write!(f, "Validation error: {msg}"),
            BotError::Service(msg) => write!(f, "Service error: {msg}"),
            BotError::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for BotError {}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::Service(err.to_string())
    }
}

impl From<rusqlite::Error> for BotError {
    fn from(err: rusqlite::Error) -> Self {
        BotError::Service(err.to_string())
    }
}
