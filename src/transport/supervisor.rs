//! Connection pool lifecycle and auto-reconnect.
//!
//! The supervisor keeps a target number of Socket Mode connections open.
//! Every `Close` notification triggers an immediate replacement, without
//! backoff or retry cap. Ended transports leave the pool on the next
//! [`step`](ConnectionSupervisor::step), so the pool may briefly hold one
//! more entry than its target.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │           ConnectionSupervisor           │
//! │  ┌────────────────────────────────────┐  │
//! │  │ ws:1 → Box<dyn Transport>          │  │
//! │  │ ws:2 → Box<dyn Transport>          │  │
//! │  │ ws:3 → Box<dyn Transport>          │  │
//! │  └────────────────────────────────────┘  │
//! │  EventDispatcher (shared dedup window)   │
//! └──────────────────────────────────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::dispatch::{DispatchAction, EventDispatcher, EventHandler};
use crate::error::Result;
use crate::identifiers::ConnectionId;

use super::notification::{Notification, NotificationSender, TransportEvent};
use super::{Connector, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Default number of concurrently maintained connections.
pub const DEFAULT_NUM_OF_CONNECTIONS: usize = 4;

// ============================================================================
// ConnectionSupervisor
// ============================================================================

/// Owns the connection pool and routes transport notifications.
///
/// Driven from a single task through `&mut self`; see
/// [`EventLoop`](crate::EventLoop).
pub struct ConnectionSupervisor {
    /// Client used to mint connection URLs.
    api: ApiClient,

    /// Opens transports.
    connector: Arc<dyn Connector>,

    /// Pool size to maintain.
    target: usize,

    /// Live connections by id.
    connections: FxHashMap<ConnectionId, Box<dyn Transport>>,

    /// Frame dispatch shared by every connection.
    dispatcher: EventDispatcher,

    /// Handed to every new transport.
    notifications: NotificationSender,
}

// ============================================================================
// ConnectionSupervisor - Constructor
// ============================================================================

impl ConnectionSupervisor {
    /// Creates an empty supervisor. Call [`start`](Self::start) to fill the pool.
    #[must_use]
    pub fn new(
        api: ApiClient,
        connector: Arc<dyn Connector>,
        target: usize,
        handler: Arc<dyn EventHandler>,
        notifications: NotificationSender,
    ) -> Self {
        Self {
            api,
            connector,
            target,
            connections: FxHashMap::default(),
            dispatcher: EventDispatcher::new(handler),
            notifications,
        }
    }

    /// Opens `target` connections if an app-level token is configured.
    ///
    /// Without one the pool stays empty and only Web API calls are usable.
    ///
    /// # Errors
    ///
    /// Any error of [`open_connection`](Self::open_connection).
    pub async fn start(&mut self) -> Result<()> {
        if !self.api.has_app_token() {
            info!("No app-level token, Socket Mode disabled");
            return Ok(());
        }

        for _ in 0..self.target {
            self.open_connection().await?;
        }

        Ok(())
    }
}

// ============================================================================
// ConnectionSupervisor - Public API
// ============================================================================

impl ConnectionSupervisor {
    /// Returns the number of connections in the pool.
    #[inline]
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns the pool size being maintained.
    #[inline]
    #[must_use]
    pub fn target_size(&self) -> usize {
        self.target
    }

    /// Returns the frame dispatcher.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Mints a URL, connects, and adds the transport to the pool.
    ///
    /// # Errors
    ///
    /// - Any Web API error of [`ApiClient::open_connection_url`]
    /// - [`Error::WebSocket`](crate::Error::WebSocket) if the handshake fails
    pub async fn open_connection(&mut self) -> Result<ConnectionId> {
        let url = self.api.open_connection_url().await?;
        let id = ConnectionId::next();

        let transport = self
            .connector
            .connect(id, url, self.notifications.clone())
            .await?;
        self.connections.insert(id, transport);

        info!(connection = %id, active = self.connections.len(), "Connection added");
        Ok(id)
    }

    /// Drops ended transports and returns the ids of the live ones.
    pub fn step(&mut self) -> Vec<ConnectionId> {
        self.connections.retain(|id, transport| {
            let tracked = transport.is_tracked();
            if !tracked {
                debug!(connection = %id, "Connection removed from pool");
            }
            tracked
        });

        self.connections.keys().copied().collect()
    }

    /// Reacts to one transport notification.
    ///
    /// # Errors
    ///
    /// - Any error of [`open_connection`](Self::open_connection) while
    ///   replacing a closed connection
    /// - [`Error::Json`](crate::Error::Json) if an acknowledgement cannot be encoded
    pub async fn handle(&mut self, notification: Notification) -> Result<()> {
        let Notification { connection, event } = notification;

        match event {
            TransportEvent::Open => {
                info!(%connection, active = self.connections.len(), "websocket open");
            }
            TransportEvent::Close => {
                info!(%connection, active = self.connections.len(), "websocket closed");
                self.open_connection().await?;
            }
            TransportEvent::Message(frame) => {
                self.handle_frame(connection, &frame).await?;
            }
        }

        Ok(())
    }
}

// ============================================================================
// ConnectionSupervisor - Frame Handling
// ============================================================================

impl ConnectionSupervisor {
    /// Dispatches a frame and applies the resulting action to its connection.
    ///
    /// A frame queued just before its transport ended is still dispatched
    /// even if [`step`](Self::step) already pruned the connection; only the
    /// follow-up action needs the transport.
    async fn handle_frame(&mut self, connection: ConnectionId, frame: &str) -> Result<()> {
        let action = self.dispatcher.dispatch(connection, frame).await;
        if action == DispatchAction::Ignore {
            return Ok(());
        }

        let Some(transport) = self.connections.get(&connection) else {
            debug!(%connection, ?action, "Connection already ended, action skipped");
            return Ok(());
        };

        match action {
            DispatchAction::Ignore => {}

            DispatchAction::Close => transport.close(),

            DispatchAction::Acknowledge(ack) => {
                let text = serde_json::to_string(&ack)?;
                if let Err(e) = transport.send(text) {
                    warn!(%connection, envelope_id = %ack.envelope_id, error = %e, "Failed to send acknowledgement");
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
