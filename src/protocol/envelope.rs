//! Envelope and acknowledgement message types.
//!
//! Envelopes are frames pushed by the platform over a Socket Mode
//! connection. Every event-class envelope must be acknowledged on the
//! connection it arrived on.
//!
//! # Envelope Kinds
//!
//! | `type` | Meaning |
//! |--------|---------|
//! | `hello` | Connection is ready |
//! | `disconnect` | Platform asks the client to reconnect |
//! | anything else | Event envelope (`events_api`, `slash_commands`, ...) |

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::identifiers::EnvelopeId;

// ============================================================================
// Envelope
// ============================================================================

/// An inbound Socket Mode frame.
///
/// Delivery metadata (`accepts_response_payload`, `retry_attempt`,
/// `retry_reason`) of an unexpected JSON type reads as absent.
///
/// # Format
///
/// ```json
/// {
///   "type": "events_api",
///   "envelope_id": "57d6a792-4d35-4d0b-b6aa-3361493e1caf",
///   "accepts_response_payload": false,
///   "retry_attempt": 0,
///   "retry_reason": "",
///   "payload": { "event_id": "Ev01", "event_time": 1700000000, "type": "event_callback" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Frame discriminator.
    #[serde(rename = "type")]
    pub kind: String,

    /// Id to echo back in the acknowledgement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope_id: Option<EnvelopeId>,

    /// Whether the acknowledgement may carry a response payload.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub accepts_response_payload: Option<bool>,

    /// Zero-based redelivery counter.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub retry_attempt: Option<u32>,

    /// Why the platform redelivered.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub retry_reason: Option<String>,

    /// Opaque event body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Any other top-level fields (`debug_info`, `reason`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Classifies the frame by its `type`.
    #[must_use]
    pub fn kind(&self) -> EnvelopeKind<'_> {
        match self.kind.as_str() {
            "hello" => EnvelopeKind::Hello,
            "disconnect" => EnvelopeKind::Disconnect,
            other => EnvelopeKind::Event(other),
        }
    }

    /// Returns `true` if the acknowledgement may carry a payload.
    #[inline]
    #[must_use]
    pub fn accepts_response_payload(&self) -> bool {
        self.accepts_response_payload.unwrap_or(false)
    }

    /// Returns `payload.event_id`.
    #[inline]
    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.payload_field("event_id").and_then(Value::as_str)
    }

    /// Returns `payload.event_time` in unix seconds.
    #[inline]
    #[must_use]
    pub fn event_time(&self) -> Option<i64> {
        self.payload_field("event_time").and_then(Value::as_i64)
    }

    /// Returns `payload.type`.
    #[inline]
    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        self.payload_field("type").and_then(Value::as_str)
    }

    /// Returns the one-based delivery attempt.
    #[inline]
    #[must_use]
    pub fn delivery_attempt(&self) -> u32 {
        self.retry_attempt.unwrap_or(0).saturating_add(1)
    }

    /// Gets a field from the payload object.
    #[inline]
    fn payload_field(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|p| p.get(key))
    }
}

/// Deserializes any JSON value, keeping it only if it fits `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ============================================================================
// EnvelopeKind
// ============================================================================

/// Classification of an [`Envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind<'a> {
    /// Connection is ready.
    Hello,
    /// Connection should be replaced.
    Disconnect,
    /// Event envelope of the given type.
    Event(&'a str),
}

// ============================================================================
// Acknowledgement
// ============================================================================

/// An outbound acknowledgement for an event envelope.
///
/// # Format
///
/// ```json
/// { "envelope_id": "57d6a792-...", "payload": { "text": "ok" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acknowledgement {
    /// Matches the envelope's id.
    pub envelope_id: EnvelopeId,

    /// Response payload, only when the envelope accepts one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Acknowledgement {
    /// Creates an acknowledgement without payload.
    #[inline]
    #[must_use]
    pub fn new(envelope_id: EnvelopeId) -> Self {
        Self {
            envelope_id,
            payload: None,
        }
    }

    /// Builds the acknowledgement for `envelope` given the handler's result.
    ///
    /// The result is attached only if the envelope accepts a response
    /// payload. Returns `None` when the envelope has no id.
    #[must_use]
    pub fn for_envelope(envelope: &Envelope, response: Option<Value>) -> Option<Self> {
        let envelope_id = envelope.envelope_id.clone()?;
        let payload = if envelope.accepts_response_payload() {
            response
        } else {
            None
        };

        Some(Self {
            envelope_id,
            payload,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
