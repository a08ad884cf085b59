//! Application event handler.

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::Envelope;

/// Application callback for event envelopes.
///
/// Called once per distinct event id, on the event-loop task. The loop
/// waits for it to return before reading the next frame. The returned
/// value becomes the acknowledgement payload when the envelope accepts
/// one.
///
/// Implemented for async closures:
///
/// ```no_run
/// use serde_json::{Value, json};
/// use socket_mode_bot::{Envelope, EventHandler};
///
/// let handler = |envelope: Envelope| async move {
///     let reply: Option<Value> = envelope.event_id().map(|id| json!({ "seen": id }));
///     reply
/// };
/// # fn assert_handler(_: impl EventHandler) {}
/// # assert_handler(handler);
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Handles one event envelope.
    async fn on_event(&self, envelope: Envelope) -> Option<Value>;
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(Envelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Value>> + Send + 'static,
{
    async fn on_event(&self, envelope: Envelope) -> Option<Value> {
        (self)(envelope).await
    }
}

/// Handler that acknowledges without doing anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

#[async_trait]
impl EventHandler for NoopHandler {
    async fn on_event(&self, _envelope: Envelope) -> Option<Value> {
        None
    }
}
