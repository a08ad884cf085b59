//! Event dispatch.
//!
//! Frames flow from a transport notification into the dispatcher, through
//! the dedup gate, into the application handler, and back out as an
//! acknowledgement on the same connection.
//!
//! ```text
//! frame ──► EventDispatcher ──► EventDeduplicator ──► EventHandler
//!                 │                                        │
//!                 ◄──────────── Acknowledgement ◄──────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dedup` | Time-bounded event id window |
//! | `dispatcher` | Frame classification and acknowledgement |
//! | `handler` | Application callback trait |

// ============================================================================
// Submodules
// ============================================================================

/// Time-bounded event id window.
pub mod dedup;

/// Frame classification and acknowledgement.
pub mod dispatcher;

/// Application callback trait.
pub mod handler;

// ============================================================================
// Re-exports
// ============================================================================

pub use dedup::{DEDUP_WINDOW_SECS, EventDeduplicator};
pub use dispatcher::{DispatchAction, EventDispatcher};
pub use handler::{EventHandler, NoopHandler};
