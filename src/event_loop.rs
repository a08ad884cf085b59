//! Single-task driver for the connection pool.
//!
//! Each cycle prunes ended connections, waits until any connection of the
//! pool reports something, and handles that notification to completion
//! (including the application handler) before the next wait. Nothing else
//! touches the pool or the dedup window, so neither needs a lock.
//!
//! There is no stop operation: [`EventLoop::run`] returns only with an
//! error. Drop the future (or abort its task) to stop the bot.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use crate::api::ApiClient;
use crate::dispatch::EventHandler;
use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;
use crate::transport::{ConnectionSupervisor, Connector, NotificationReceiver};

// ============================================================================
// EventLoop
// ============================================================================

/// Cooperative event loop over a [`ConnectionSupervisor`].
pub struct EventLoop {
    /// Pool owner.
    supervisor: ConnectionSupervisor,
    /// Notifications from every transport of the pool.
    notifications: NotificationReceiver,
}

impl EventLoop {
    /// Creates a loop with an empty pool.
    #[must_use]
    pub fn new(
        api: ApiClient,
        connector: Arc<dyn Connector>,
        num_of_connections: usize,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        let (notifications_tx, notifications) = mpsc::unbounded_channel();
        let supervisor =
            ConnectionSupervisor::new(api, connector, num_of_connections, handler, notifications_tx);

        Self {
            supervisor,
            notifications,
        }
    }

    /// Fills the pool. See [`ConnectionSupervisor::start`].
    ///
    /// # Errors
    ///
    /// Any error while opening the initial connections.
    pub async fn start(&mut self) -> Result<()> {
        self.supervisor.start().await
    }

    /// Returns the pool owner.
    #[inline]
    #[must_use]
    pub fn supervisor(&self) -> &ConnectionSupervisor {
        &self.supervisor
    }

    /// Prunes ended connections and returns the live ones.
    pub fn step(&mut self) -> Vec<ConnectionId> {
        self.supervisor.step()
    }

    /// Runs one cycle: step, wait for a notification, handle it.
    ///
    /// # Errors
    ///
    /// - Any error of [`ConnectionSupervisor::handle`]
    /// - [`Error::ChannelClosed`] if no transport can report anymore
    pub async fn turn(&mut self) -> Result<()> {
        let live = self.step();
        trace!(live = live.len(), "Waiting for notifications");

        let notification = self
            .notifications
            .recv()
            .await
            .ok_or(Error::ChannelClosed)?;

        self.supervisor.handle(notification).await
    }

    /// Runs cycles forever.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`turn`](Self::turn).
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.turn().await?;
        }
    }
}
