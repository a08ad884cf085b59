//! Error types for the Socket Mode bot.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use socket_mode_bot::{ApiClient, Error, Result};
//!
//! async fn example(api: &ApiClient) -> Result<()> {
//!     match api.call("auth.test", &serde_json::json!({})).await {
//!         Err(Error::Api { error }) if error == "invalid_auth" => { /* rotate token */ }
//!         other => { other?; }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Web API | [`Error::Api`], [`Error::Network`], [`Error::Http`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::ChannelClosed`] |
//! | Protocol | [`Error::Protocol`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Url`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;
use url::ParseError as UrlError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bot or client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Web API Errors
    // ========================================================================
    /// The platform answered with `ok: false`.
    ///
    /// Displays as the platform's `error` string, verbatim. Never retried.
    #[error("{error}")]
    Api {
        /// The `error` field of the response.
        error: String,
    },

    /// Transient network failure (name resolution, connect, timeout).
    ///
    /// Retried by [`ApiClient`](crate::api::ApiClient) before surfacing.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-transient HTTP client failure.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when a Socket Mode connection cannot be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// WebSocket connection closed.
    ///
    /// Returned when sending on a transport whose I/O task has ended.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Notification channel closed.
    #[error("Channel closed")]
    ChannelClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected response shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a Web API error from the platform's `error` string.
    #[inline]
    pub fn api(error: impl Into<String>) -> Self {
        Self::Api {
            error: error.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    /// Splits HTTP client failures into transient and permanent ones.
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Network(err)
        } else {
            Self::Http(err)
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if retrying the same call may succeed.
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns `true` if the platform rejected the call with `ok: false`.
    #[inline]
    #[must_use]
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Returns the platform's `error` string for [`Error::Api`].
    #[inline]
    #[must_use]
    pub fn api_error(&self) -> Option<&str> {
        match self {
            Self::Api { error } => Some(error),
            _ => None,
        }
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionClosed
                | Self::ChannelClosed
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
