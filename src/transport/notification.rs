//! Notifications reported by transports to the event loop.

use tokio::sync::mpsc;

use crate::identifiers::ConnectionId;

/// Sender half handed to every transport of a pool.
pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Receiver half owned by the event loop.
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// What happened on a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed.
    Open,
    /// A text frame arrived.
    Message(String),
    /// The transport terminated and is no longer tracked.
    Close,
}

/// A [`TransportEvent`] tagged with its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Connection the event happened on.
    pub connection: ConnectionId,
    /// The event.
    pub event: TransportEvent,
}

impl Notification {
    /// Creates a notification.
    #[inline]
    #[must_use]
    pub fn new(connection: ConnectionId, event: TransportEvent) -> Self {
        Self { connection, event }
    }
}
