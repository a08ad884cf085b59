//! Socket Mode bot client.
//!
//! The platform pushes events to the bot over a small pool of long-lived
//! WebSocket connections instead of calling an inbound webhook. This crate
//! keeps that pool alive, delivers each distinct event to application code
//! once, acknowledges it on the connection it arrived on, and provides a
//! retrying client for the platform's Web API.
//!
//! # Architecture
//!
//! ```text
//! EventLoop ─► ConnectionSupervisor ─► WsConnection (× N)
//!                    │                        │ Open / Message / Close
//!                    │◄───────────────────────┘
//!                    ├─► EventDispatcher ─► EventDeduplicator ─► EventHandler
//!                    │          └──────── Acknowledgement ──► same connection
//!                    └─► ApiClient (apps.connections.open on every close)
//! ```
//!
//! Everything above the transports runs on one task: handlers never run
//! concurrently and the loop waits for each one to return.
//!
//! # Quick Start
//!
//! ```no_run
//! use serde_json::{Value, json};
//! use socket_mode_bot::{ApiClient, Bot, Envelope, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let api = ApiClient::new("xoxb-...")?;
//!
//!     let mut bot = Bot::builder()
//!         .name("echo")
//!         .token("xoxb-...")
//!         .app_token("xapp-...")
//!         .handler(move |envelope: Envelope| {
//!             let api = api.clone();
//!             async move {
//!                 if let Some(channel) = envelope
//!                     .payload
//!                     .as_ref()
//!                     .and_then(|p| p.pointer("/event/channel"))
//!                 {
//!                     let _ = api.say(&json!({"channel": channel, "text": "pong"})).await;
//!                 }
//!                 None::<Value>
//!             }
//!         })
//!         .build()
//!         .await?;
//!
//!     bot.run().await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Web API client and typed responses |
//! | [`bot`] | [`Bot`] facade and [`BotBuilder`] |
//! | [`dispatch`] | Frame dispatch, dedup window, handler trait |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`event_loop`] | Single-task driver |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Envelope and acknowledgement types |
//! | [`transport`] | WebSocket transports and the connection pool |

// ============================================================================
// Modules
// ============================================================================

/// Web API client and typed responses.
pub mod api;

/// Bot facade and configuration.
///
/// Use [`Bot::builder()`] to create a configured bot.
pub mod bot;

/// Frame dispatch, dedup window and handler trait.
pub mod dispatch;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Single-task driver over the connection pool.
pub mod event_loop;

/// Type-safe identifiers.
pub mod identifiers;

/// Socket Mode message types.
pub mod protocol;

/// WebSocket transports and the connection pool.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Web API types
pub use api::{ApiClient, HttpMethod};

// Bot types
pub use bot::{Bot, BotBuilder};

// Dispatch types
pub use dispatch::{EventDeduplicator, EventDispatcher, EventHandler};

// Error types
pub use error::{Error, Result};

// Event loop
pub use event_loop::EventLoop;

// Identifier types
pub use identifiers::{ConnectionId, EnvelopeId};

// Protocol types
pub use protocol::{Acknowledgement, Envelope, EnvelopeKind};

// Transport types
pub use transport::{
    ConnectionSupervisor, Connector, Notification, NotificationSender, Transport,
    TransportEvent, WsConnector,
};
