// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the transport, the engine, and the presentation layer.
//!
//! Field names on the wire are camelCase and follow the chat server's
//! JSON records (`chatId`, `messageId`, `readTimestamp`, ...).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Server-assigned identifier of a two-party conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

/// Server-assigned identifier of a message, unique within its conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Identifier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A chat message as known to the client.
///
/// `id` is `None` only for outgoing messages the server has not confirmed
/// yet. `read_at` is `None` while the message is unread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "messageId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    #[serde(rename = "chatId")]
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub content: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "readTimestamp", default)]
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Whether the recipient has read this message.
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Whether the server has assigned an id to this message.
    pub fn is_confirmed(&self) -> bool {
        self.id.is_some()
    }
}

/// Classification of a detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// A message not present in the previous snapshot.
    NewMessage,
    /// A known message whose read timestamp went from null to non-null.
    ReadReceipt,
}

/// A message that the presentation layer must be notified about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub kind: UpdateKind,
    pub message: Message,
}

impl UpdateEvent {
    pub fn new_message(message: Message) -> Self {
        Self {
            kind: UpdateKind::NewMessage,
            message,
        }
    }

    pub fn read_receipt(message: Message) -> Self {
        Self {
            kind: UpdateKind::ReadReceipt,
            message,
        }
    }
}

/// Display metadata for a conversation in the current user's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(rename = "chatId")]
    pub conversation_id: ConversationId,
    pub other_user_id: UserId,
    pub other_user_name: String,
    #[serde(default)]
    pub other_user_avatar_url: Option<String>,
    #[serde(default)]
    pub last_message_content: Option<String>,
    #[serde(rename = "lastMessageTimestamp", default)]
    pub last_message_at: Option<DateTime<Utc>>,
}

/// A message the local user wants to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub conversation_id: ConversationId,
    pub content: String,
}

impl OutgoingMessage {
    pub fn new(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            content: content.into(),
        }
    }
}

/// Body of a message post, stamped with the sender by the send path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[serde(rename = "chatId")]
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
}

/// Coarse, process-wide transport health.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}
