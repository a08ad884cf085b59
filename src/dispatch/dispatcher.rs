//! Inbound frame classification and acknowledgement.
//!
//! # Frame Handling
//!
//! | Frame | Action |
//! |-------|--------|
//! | not JSON / not an envelope | close the connection |
//! | `hello` | none |
//! | `disconnect` | close the connection |
//! | event, id already in window | none (no handler call, no ack) |
//! | event, new id | handler call, then ack on the same connection |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::identifiers::ConnectionId;
use crate::protocol::{Acknowledgement, Envelope, EnvelopeKind};

use super::dedup::EventDeduplicator;
use super::handler::EventHandler;

// ============================================================================
// DispatchAction
// ============================================================================

/// What the owner of the connection must do after a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchAction {
    /// Nothing to send.
    Ignore,
    /// Close the connection; a replacement follows its close notification.
    Close,
    /// Send this acknowledgement on the same connection.
    Acknowledge(Acknowledgement),
}

// ============================================================================
// EventDispatcher
// ============================================================================

/// Routes inbound frames to the application handler.
///
/// One dispatcher serves every connection of a pool so that an event
/// redelivered on another connection is still recognized.
pub struct EventDispatcher {
    handler: Arc<dyn EventHandler>,
    dedup: EventDeduplicator,
}

impl EventDispatcher {
    /// Creates a dispatcher with an empty dedup window.
    #[must_use]
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self {
            handler,
            dedup: EventDeduplicator::new(),
        }
    }

    /// Returns the dedup window.
    #[inline]
    #[must_use]
    pub fn dedup(&self) -> &EventDeduplicator {
        &self.dedup
    }

    /// Handles one raw frame received on `connection`.
    pub async fn dispatch(&mut self, connection: ConnectionId, frame: &str) -> DispatchAction {
        self.dispatch_at(connection, frame, unix_now()).await
    }

    /// Handles one raw frame with an explicit current time (unix seconds).
    pub async fn dispatch_at(
        &mut self,
        connection: ConnectionId,
        frame: &str,
        now: i64,
    ) -> DispatchAction {
        let envelope: Envelope = match serde_json::from_str(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(%connection, error = %e, "Malformed frame, closing connection");
                return DispatchAction::Close;
            }
        };

        debug!(%connection, frame, "Socket Mode frame");

        match envelope.kind() {
            EnvelopeKind::Hello => {
                info!(%connection, "hello");
                return DispatchAction::Ignore;
            }
            EnvelopeKind::Disconnect => {
                let reason = envelope.extra.get("reason").and_then(|r| r.as_str());
                info!(%connection, reason, "disconnect requested");
                return DispatchAction::Close;
            }
            EnvelopeKind::Event(_) => {}
        }

        self.dispatch_event(connection, envelope, now).await
    }

    /// Dedup gate, handler call and acknowledgement for an event envelope.
    async fn dispatch_event(
        &mut self,
        connection: ConnectionId,
        envelope: Envelope,
        now: i64,
    ) -> DispatchAction {
        info!(
            %connection,
            kind = %envelope.kind,
            attempt = envelope.delivery_attempt(),
            event_id = envelope.event_id(),
            event_time = envelope.event_time(),
            event_type = envelope.event_type(),
            "Event envelope"
        );

        // Every event envelope ages the window, including those without an
        // event id (slash commands, interactivity), which are never recorded.
        self.dedup.prune(now);
        if let Some(event_id) = envelope.event_id() {
            if self.dedup.seen(event_id) {
                debug!(%connection, event_id, "Duplicate event ignored");
                return DispatchAction::Ignore;
            }
            self.dedup.record(event_id, envelope.event_time().unwrap_or(now));
        }

        let response = self.handler.on_event(envelope.clone()).await;

        match Acknowledgement::for_envelope(&envelope, response) {
            Some(ack) => DispatchAction::Acknowledge(ack),
            None => {
                warn!(%connection, kind = %envelope.kind, "Event envelope without envelope_id, not acknowledged");
                DispatchAction::Ignore
            }
        }
    }
}

/// Current unix time in seconds.
fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
