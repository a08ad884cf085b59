//! Socket Mode protocol message types.
//!
//! This module defines the frames exchanged over a Socket Mode connection.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Envelope` | Platform → Client | Control frame or event |
//! | `Acknowledgement` | Client → Platform | Receipt of an event envelope |
//!
//! Connection URLs are minted over the Web API (`apps.connections.open`);
//! see [`crate::api`].

// ============================================================================
// Submodules
// ============================================================================

/// Envelope and acknowledgement types.
pub mod envelope;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::{Acknowledgement, Envelope, EnvelopeKind};
