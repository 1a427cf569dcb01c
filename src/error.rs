// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error (missing credentials, missing table, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The announcement list could not be fetched or decoded
    #[error("List fetch failed for {url}: {message}")]
    ListFetch { url: String, message: String },

    /// A detail page could not be fetched
    #[error("Detail fetch failed for {url}: {message}")]
    DetailFetch { url: String, message: String },

    /// The hosting service rejected a deploy or upload
    #[error("Publish failed with status {status}: {body}")]
    Publish { status: u16, body: String },

    /// A stored entry could not be decoded
    #[error("Store error: {0}")]
    Store(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a list fetch error.
    pub fn list_fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::ListFetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a detail fetch error.
    pub fn detail_fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::DetailFetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }
}
