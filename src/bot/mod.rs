//! Bot facade.
//!
//! This module provides the main entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bot`] | Identity, Web API client and event loop |
//! | [`BotBuilder`] | Fluent configuration builder |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for bot configuration.
pub mod builder;

/// Core bot implementation.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::builder::BotBuilder;
pub use self::core::Bot;
