// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic message and conversation builders.

use chrono::{DateTime, TimeZone, Utc};
use parley_core::types::{ConversationId, ConversationSummary, Message, MessageId, UserId};

/// Fixed reference instant; message `n` is created `n` seconds after it.
pub fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_767_225_600, 0).single().unwrap_or_default()
}

/// An unread, confirmed message.
pub fn message(conversation_id: i64, id: i64, sender_id: i64) -> Message {
    Message {
        id: Some(MessageId(id)),
        conversation_id: ConversationId(conversation_id),
        sender_id: UserId(sender_id),
        sender_name: Some(format!("user-{sender_id}")),
        content: format!("message {id}"),
        created_at: epoch() + chrono::Duration::seconds(id),
        read_at: None,
    }
}

/// Returns `message` marked read `secs` seconds after the epoch.
pub fn read(mut message: Message, secs: i64) -> Message {
    message.read_at = Some(epoch() + chrono::Duration::seconds(secs));
    message
}

pub fn conversation(conversation_id: i64, other_user_id: i64) -> ConversationSummary {
    ConversationSummary {
        conversation_id: ConversationId(conversation_id),
        other_user_id: UserId(other_user_id),
        other_user_name: format!("user-{other_user_id}"),
        other_user_avatar_url: None,
        last_message_content: None,
        last_message_at: None,
    }
}
