//! Builder pattern for bot configuration.
//!
//! Provides a fluent API for configuring and creating [`Bot`] instances.
//!
//! # Example
//!
//! ```no_run
//! use socket_mode_bot::{Bot, Envelope};
//!
//! # async fn example() -> socket_mode_bot::Result<()> {
//! let mut bot = Bot::builder()
//!     .name("deploy-bot")
//!     .token("xoxb-...")
//!     .app_token("xapp-...")
//!     .handler(|envelope: Envelope| async move {
//!         tracing::info!(kind = %envelope.kind, "event");
//!         None::<serde_json::Value>
//!     })
//!     .build()
//!     .await?;
//!
//! bot.run().await
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::dispatch::{EventHandler, NoopHandler};
use crate::error::{Error, Result};
use crate::transport::supervisor::DEFAULT_NUM_OF_CONNECTIONS;
use crate::transport::{Connector, WsConnector};

use super::core::Bot;

// ============================================================================
// BotBuilder
// ============================================================================

/// Builder for configuring a [`Bot`] instance.
///
/// Use [`Bot::builder()`] to create a new builder.
#[derive(Clone)]
pub struct BotBuilder {
    /// Identity label.
    name: Option<String>,
    /// Primary Web API token.
    token: Option<String>,
    /// App-level token; gates Socket Mode.
    app_token: Option<String>,
    /// Pool size.
    num_of_connections: usize,
    /// Debug mode.
    debug: bool,
    /// Web API base endpoint override.
    api_base_url: Option<String>,
    /// Retry policy override.
    retry: Option<(u32, Duration)>,
    /// Application handler.
    handler: Option<Arc<dyn EventHandler>>,
    /// Transport factory.
    connector: Option<Arc<dyn Connector>>,
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self {
            name: None,
            token: None,
            app_token: None,
            num_of_connections: DEFAULT_NUM_OF_CONNECTIONS,
            debug: false,
            api_base_url: None,
            retry: None,
            handler: None,
            connector: None,
        }
    }
}

impl fmt::Debug for BotBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotBuilder")
            .field("name", &self.name)
            .field("has_token", &self.token.is_some())
            .field("has_app_token", &self.app_token.is_some())
            .field("num_of_connections", &self.num_of_connections)
            .field("debug", &self.debug)
            .field("api_base_url", &self.api_base_url)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// BotBuilder Implementation
// ============================================================================

impl BotBuilder {
    /// Creates a new builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bot's identity label, matched by [`Bot::is_name`].
    #[inline]
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the primary token (`xoxb-...`) used for Web API calls.
    #[inline]
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the app-level token (`xapp-...`) used to open connections.
    ///
    /// Without it no connection is opened.
    #[inline]
    #[must_use]
    pub fn app_token(mut self, app_token: impl Into<String>) -> Self {
        self.app_token = Some(app_token.into());
        self
    }

    /// Sets the number of connections to maintain (default 4).
    #[inline]
    #[must_use]
    pub fn num_of_connections(mut self, count: usize) -> Self {
        self.num_of_connections = count;
        self
    }

    /// Enables the reconnect-debug flag and GET response dumps.
    #[inline]
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Overrides the Web API base endpoint.
    #[inline]
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Overrides the Web API retry policy.
    #[inline]
    #[must_use]
    pub fn retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.retry = Some((max_attempts, delay));
        self
    }

    /// Sets the application event handler.
    #[inline]
    #[must_use]
    pub fn handler(mut self, handler: impl EventHandler) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Replaces the WebSocket connector.
    #[inline]
    #[must_use]
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Builds the bot: authenticates, then opens the connection pool.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if name or token is missing or empty, the app
    ///   token is empty, or `num_of_connections` is zero
    /// - Any Web API error of `auth.test` or `apps.connections.open`
    pub async fn build(self) -> Result<Bot> {
        let name = self.validate_name()?;
        let api = self.build_api_client()?;
        self.validate_pool()?;

        let handler: Arc<dyn EventHandler> = match self.handler {
            Some(handler) => handler,
            None => Arc::new(NoopHandler),
        };
        let connector: Arc<dyn Connector> = match self.connector {
            Some(connector) => connector,
            None => Arc::new(WsConnector),
        };

        Bot::connect(name, api, self.num_of_connections, handler, connector).await
    }
}

// ============================================================================
// Validation
// ============================================================================

impl BotBuilder {
    /// Validates the identity label.
    fn validate_name(&self) -> Result<String> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name.to_owned()),
            _ => Err(Error::config(
                "Bot name is required. Use .name() to set it.\n\
                 Example: Bot::builder().name(\"deploy-bot\")",
            )),
        }
    }

    /// Validates tokens and assembles the Web API client.
    fn build_api_client(&self) -> Result<ApiClient> {
        let token = match self.token.as_deref() {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(Error::config(
                    "Token is required. Use .token() to set it.\n\
                     Example: Bot::builder().token(\"xoxb-...\")",
                ));
            }
        };

        let mut api = ApiClient::new(token)?.with_debug(self.debug);

        if let Some(app_token) = self.app_token.as_deref() {
            if app_token.is_empty() {
                return Err(Error::config("App-level token must not be empty"));
            }
            api = api.with_app_token(app_token);
        }

        if let Some(url) = self.api_base_url.as_deref() {
            api = api.with_base_url(url)?;
        }

        if let Some((max_attempts, delay)) = self.retry {
            api = api.with_retry(max_attempts, delay);
        }

        Ok(api)
    }

    /// Validates the pool size.
    fn validate_pool(&self) -> Result<()> {
        if self.num_of_connections == 0 {
            return Err(Error::config("num_of_connections must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio_test::assert_err;

    #[test]
    fn test_default_builder() {
        let builder = BotBuilder::new();
        assert!(builder.name.is_none());
        assert!(builder.token.is_none());
        assert!(builder.app_token.is_none());
        assert_eq!(builder.num_of_connections, DEFAULT_NUM_OF_CONNECTIONS);
        assert!(!builder.debug);
    }

    #[test]
    fn test_setters() {
        let builder = BotBuilder::new()
            .name("bot")
            .token("xoxb")
            .app_token("xapp")
            .num_of_connections(2)
            .debug(true)
            .api_base_url("http://127.0.0.1:1/api/");

        assert_eq!(builder.name.as_deref(), Some("bot"));
        assert_eq!(builder.app_token.as_deref(), Some("xapp"));
        assert_eq!(builder.num_of_connections, 2);
        assert!(builder.debug);
        assert!(builder.handler.is_none());
    }

    #[tokio::test]
    async fn test_build_fails_without_name() {
        let err = assert_err!(BotBuilder::new().token("xoxb").build().await);
        assert!(err.to_string().contains("name"));
    }

    #[tokio::test]
    async fn test_build_fails_without_token() {
        let err = assert_err!(BotBuilder::new().name("bot").build().await);
        assert!(err.to_string().contains("Token"));
    }

    #[tokio::test]
    async fn test_build_fails_with_empty_app_token() {
        let result = BotBuilder::new()
            .name("bot")
            .token("xoxb")
            .app_token("")
            .build()
            .await;
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_build_fails_with_zero_connections() {
        let result = BotBuilder::new()
            .name("bot")
            .token("xoxb")
            .num_of_connections(0)
            .build()
            .await;
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_build_fails_with_bad_base_url() {
        let result = BotBuilder::new()
            .name("bot")
            .token("xoxb")
            .api_base_url("not a url")
            .build()
            .await;
        assert!(matches!(result, Err(Error::Url(_))));
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = BotBuilder::new().name("bot");
        let cloned = builder.clone();
        assert_eq!(builder.name, cloned.name);
    }
}
