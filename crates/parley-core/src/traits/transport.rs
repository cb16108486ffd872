// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport collaborator for the chat REST API.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::{ConversationId, ConversationSummary, Message, PostMessageRequest};

/// Request/response primitives the engine needs from the chat server.
///
/// Implementations report rejected credentials as
/// [`ParleyError::Authentication`] and every other failure as
/// [`ParleyError::Transport`].
#[async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    /// Lists the conversations of the current user.
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ParleyError>;

    /// Fetches every message of a conversation, oldest first.
    async fn fetch_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ParleyError>;

    /// Posts a new message and returns the server-confirmed copy.
    async fn post_message(&self, request: &PostMessageRequest) -> Result<Message, ParleyError>;

    /// Marks the conversation's messages as read for the current user.
    async fn mark_read(&self, conversation_id: ConversationId) -> Result<(), ParleyError>;
}
