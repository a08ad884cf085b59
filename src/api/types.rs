//! Typed records for the Web API responses the bot consumes.
//!
//! Only the fields the bot relies on are typed; everything else stays
//! available through the flattened `extra` maps.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Response of `auth.test`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthTest {
    /// Workspace URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Workspace name.
    #[serde(default)]
    pub team: Option<String>,
    /// Canonical user name of the token's owner.
    pub user: String,
    /// Workspace id.
    #[serde(default)]
    pub team_id: Option<String>,
    /// User id of the token's owner.
    pub user_id: String,
    /// Bot id, for bot tokens.
    #[serde(default)]
    pub bot_id: Option<String>,
}

/// Response of `users.info`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UsersInfo {
    /// The requested user.
    pub user: User,
}

/// A workspace member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    /// User id.
    pub id: String,
    /// Handle.
    #[serde(default)]
    pub name: String,
    /// Display-independent full name.
    #[serde(default)]
    pub real_name: Option<String>,
    /// Whether the member is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// Whether the account is deactivated.
    #[serde(default)]
    pub deleted: bool,
    /// Remaining fields (`profile`, `tz`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `conversations.replies`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationReplies {
    /// Parent message followed by its replies.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Whether more replies are available.
    #[serde(default)]
    pub has_more: bool,
    /// Pagination cursor for the next page.
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

impl ConversationReplies {
    /// Returns the cursor for the next page, if any.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.response_metadata
            .as_ref()
            .map(|m| m.next_cursor.as_str())
            .filter(|c| !c.is_empty())
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    /// Message timestamp, unique within the channel.
    pub ts: String,
    /// Author user id; absent for some bot messages.
    #[serde(default)]
    pub user: Option<String>,
    /// Message text.
    #[serde(default)]
    pub text: String,
    /// Thread parent timestamp.
    #[serde(default)]
    pub thread_ts: Option<String>,
    /// Remaining fields (`blocks`, `bot_id`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseMetadata {
    /// Cursor for the next page; empty on the last page.
    #[serde(default)]
    pub next_cursor: String,
}
