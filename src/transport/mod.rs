//! Socket Mode transport layer.
//!
//! This module keeps a pool of WebSocket connections to the platform and
//! reports everything that happens on them to the event loop.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────┐        apps.connections.open        ┌──────────┐
//! │  ConnectionSupervisor  │────────────────────────────────────►│  Web API │
//! │                        │                                     └──────────┘
//! │  ws:1 ─ WsConnection ──┼──────────── WebSocket ─────────────►┌──────────┐
//! │  ws:2 ─ WsConnection ──┼──────────── WebSocket ─────────────►│ Platform │
//! │  ...                   │                                     └──────────┘
//! └───────────▲────────────┘
//!             │ Notification { connection, Open | Message | Close }
//!       (single channel, drained by the event loop)
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `ApiClient::open_connection_url` - Mint a connection URL
//! 2. `Connector::connect` - Open the transport, report `Open`
//! 3. Frames are reported as `Message` and dispatched
//! 4. The transport ends and reports `Close`; the supervisor opens a replacement
//! 5. `ConnectionSupervisor::step` - Drop the ended transport from the pool
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and I/O task |
//! | `notification` | Transport notifications |
//! | `supervisor` | Pool lifecycle and auto-reconnect |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and I/O task.
pub mod connection;

/// Transport notifications.
pub mod notification;

/// Pool lifecycle and auto-reconnect.
pub mod supervisor;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::identifiers::ConnectionId;

// ============================================================================
// Traits
// ============================================================================

/// One duplex connection owned by the pool.
///
/// Implementations report `Open`, `Message` and `Close` through the
/// [`NotificationSender`] they were created with.
pub trait Transport: Send + Sync {
    /// Identifier assigned when the connection was opened.
    fn id(&self) -> ConnectionId;

    /// Queues a text frame.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the
    ///   transport has terminated
    fn send(&self, text: String) -> Result<()>;

    /// Requests the connection to close. `Close` is reported once it has.
    fn close(&self);

    /// Returns `false` once the transport has terminated.
    fn is_tracked(&self) -> bool;
}

/// Opens transports.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Connects to `url` and returns the live transport.
    async fn connect(
        &self,
        id: ConnectionId,
        url: Url,
        notifications: NotificationSender,
    ) -> Result<Box<dyn Transport>>;
}

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{WsConnection, WsConnector};
pub use notification::{Notification, NotificationReceiver, NotificationSender, TransportEvent};
pub use supervisor::ConnectionSupervisor;
