// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outgoing message path.
//!
//! Content is trimmed and validated locally, stamped with the signed-in
//! user and posted. A confirmed message for a subscribed conversation is
//! merged into the snapshot and announced right away, without waiting for
//! the next poll. The poll that later returns it does not announce it again.

use parley_core::ParleyError;
use parley_core::types::{ConversationId, Message, OutgoingMessage, PostMessageRequest, UpdateEvent};
use tracing::{debug, info, warn};

use crate::engine::EngineInner;

/// Trims `content` and checks it against the length limit (in characters).
pub fn validate_content(content: &str, max_length: usize) -> Result<String, ParleyError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ParleyError::Validation(
            "message content must not be empty".into(),
        ));
    }
    let length = trimmed.chars().count();
    if length > max_length {
        return Err(ParleyError::Validation(format!(
            "message content is {length} characters, the limit is {max_length}"
        )));
    }
    Ok(trimmed.to_string())
}

impl EngineInner {
    pub(crate) async fn send(&self, outgoing: OutgoingMessage) -> Result<Message, ParleyError> {
        let content = validate_content(&outgoing.content, self.settings.max_content_length)?;
        let sender_id = self.auth.current_user_id().ok_or_else(|| {
            ParleyError::Authentication("no signed-in user; cannot send messages".into())
        })?;

        let request = PostMessageRequest {
            conversation_id: outgoing.conversation_id,
            sender_id,
            content,
        };

        let confirmed = match self.transport.post_message(&request).await {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    conversation_id = %request.conversation_id,
                    error = %e,
                    "send failed"
                );
                self.status.mark_failure();
                return Err(e);
            }
        };
        self.status.mark_success();

        info!(
            conversation_id = %request.conversation_id,
            message_id = ?confirmed.id,
            "message sent"
        );
        self.record_sent(request.conversation_id, &confirmed);
        Ok(confirmed)
    }

    /// Merges a confirmed message into a subscribed conversation and
    /// announces it. No-op for unsubscribed conversations.
    fn record_sent(&self, conversation_id: ConversationId, confirmed: &Message) {
        let Some(mut sub) = self.subscriptions.get_mut(&conversation_id) else {
            debug!(conversation_id = %conversation_id, "sent to unsubscribed conversation");
            return;
        };

        if !self.store.append_if_absent(conversation_id, confirmed.clone()) {
            debug!(
                conversation_id = %conversation_id,
                message_id = ?confirmed.id,
                "sent message already delivered by poll"
            );
            return;
        }

        if let Some(id) = confirmed.id {
            sub.announced.insert(id);
        }
        sub.channel.publish(UpdateEvent::new_message(confirmed.clone()));
    }
}
