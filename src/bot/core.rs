//! Socket Mode bot.
//!
//! The [`Bot`] ties together the Web API client, the bot's identity and the
//! event loop that keeps the connection pool alive.
//!
//! # Example
//!
//! ```no_run
//! use socket_mode_bot::Bot;
//! use serde_json::json;
//!
//! # async fn example() -> socket_mode_bot::Result<()> {
//! let bot = Bot::builder().name("helper").token("xoxb-...").build().await?;
//!
//! // Without an app-level token the bot is a plain Web API client.
//! bot.api().say(&json!({"channel": "C1", "text": "hi"})).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::api::ApiClient;
use crate::dispatch::EventHandler;
use crate::error::Result;
use crate::event_loop::EventLoop;
use crate::identifiers::ConnectionId;
use crate::transport::Connector;

use super::builder::BotBuilder;

// ============================================================================
// Bot
// ============================================================================

/// Socket Mode bot.
///
/// Several bots may live in one process; each owns its pool and dedup
/// window.
pub struct Bot {
    /// Identity label.
    name: String,
    /// User id of the primary token's owner.
    user_id: String,
    /// Canonical user name of the primary token's owner.
    canonical_name: String,
    /// Web API client.
    api: ApiClient,
    /// Pool driver.
    event_loop: EventLoop,
}

// ============================================================================
// Bot - Display
// ============================================================================

impl fmt::Debug for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("name", &self.name)
            .field("user_id", &self.user_id)
            .field("canonical_name", &self.canonical_name)
            .field("connection_count", &self.connection_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Bot - Constructor
// ============================================================================

impl Bot {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> BotBuilder {
        BotBuilder::new()
    }

    /// Authenticates and opens the pool.
    pub(crate) async fn connect(
        name: String,
        api: ApiClient,
        num_of_connections: usize,
        handler: Arc<dyn EventHandler>,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        let auth = api.auth_test(&json!({})).await?;
        info!(
            name = %name,
            user_id = %auth.user_id,
            user = %auth.user,
            "Authenticated"
        );

        let mut event_loop = EventLoop::new(api.clone(), connector, num_of_connections, handler);
        event_loop.start().await?;

        Ok(Self {
            name,
            user_id: auth.user_id,
            canonical_name: auth.user,
            api,
            event_loop,
        })
    }
}

// ============================================================================
// Bot - Public API
// ============================================================================

impl Bot {
    /// Returns the identity label.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if `candidate` is this bot's identity label.
    #[inline]
    #[must_use]
    pub fn is_name(&self, candidate: &str) -> bool {
        candidate == self.name
    }

    /// Returns the user id reported by `auth.test`.
    #[inline]
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the user name reported by `auth.test`.
    #[inline]
    #[must_use]
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// Returns the Web API client.
    #[inline]
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Returns the number of connections in the pool.
    #[inline]
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.event_loop.supervisor().connection_count()
    }

    /// Prunes ended connections and returns the live ones.
    pub fn step(&mut self) -> Vec<ConnectionId> {
        self.event_loop.step()
    }

    /// Runs one event-loop cycle. See [`EventLoop::turn`].
    ///
    /// # Errors
    ///
    /// Any error of [`EventLoop::turn`].
    pub async fn turn(&mut self) -> Result<()> {
        self.event_loop.turn().await
    }

    /// Runs the event loop for the lifetime of the process.
    ///
    /// # Errors
    ///
    /// Returns only with an error, e.g. when a replacement connection
    /// cannot be opened.
    pub async fn run(&mut self) -> Result<()> {
        info!(name = %self.name, connections = self.connection_count(), "Event loop running");
        self.event_loop.run().await
    }
}
