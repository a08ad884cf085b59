//! Convenience wrappers over [`ApiClient::call_with`].
//!
//! Each wrapper passes its parameters through unchanged and decodes the
//! response into a typed record where the bot needs one.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

use super::client::{ApiClient, HttpMethod};
use super::types::{AuthTest, ConversationReplies, UsersInfo};

impl ApiClient {
    /// `chat.postMessage` over POST.
    pub async fn chat_post_message(&self, params: &Value) -> Result<Value> {
        self.call("chat.postMessage", params).await
    }

    /// Alias for [`chat_post_message`](Self::chat_post_message).
    #[inline]
    pub async fn say(&self, params: &Value) -> Result<Value> {
        self.chat_post_message(params).await
    }

    /// `users.info` over GET.
    pub async fn users_info(&self, params: &Value) -> Result<UsersInfo> {
        self.call_typed("users.info", params, HttpMethod::Get).await
    }

    /// `conversations.replies` over GET.
    pub async fn conversations_replies(&self, params: &Value) -> Result<ConversationReplies> {
        self.call_typed("conversations.replies", params, HttpMethod::Get)
            .await
    }

    /// `auth.test` over POST, identifying the primary token's owner.
    pub async fn auth_test(&self, params: &Value) -> Result<AuthTest> {
        self.call_typed("auth.test", params, HttpMethod::Post).await
    }

    /// Calls with the primary token and decodes the response.
    async fn call_typed<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &Value,
        http_method: HttpMethod,
    ) -> Result<T> {
        let response = self.call_with(method, params, None, http_method).await?;
        Ok(serde_json::from_value(response)?)
    }
}
