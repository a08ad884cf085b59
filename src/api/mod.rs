//! Web API access.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `client` | Retrying request/response client, connection URL minting |
//! | `methods` | Per-endpoint convenience wrappers |
//! | `types` | Typed response records |

// ============================================================================
// Submodules
// ============================================================================

/// Retrying Web API client.
pub mod client;

/// Per-endpoint convenience wrappers.
mod methods;

/// Typed response records.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{
    ApiClient, DEFAULT_API_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, HttpMethod,
};
pub use types::{AuthTest, ConversationReplies, Message, User, UsersInfo};
