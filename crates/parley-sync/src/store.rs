// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation cache of the last known message set.
//!
//! Snapshots are immutable `Arc<Vec<Message>>` values. Writers swap in a
//! new `Arc` (or copy-on-write through [`Arc::make_mut`]), so a reader
//! holding a snapshot never observes a half-applied update.

use std::sync::Arc;

use dashmap::DashMap;
use parley_core::types::{ConversationId, Message};

/// An immutable, cheaply cloneable view of one conversation's messages.
pub type Snapshot = Arc<Vec<Message>>;

/// Latest known snapshot per conversation.
#[derive(Debug, Default)]
pub struct MessageStore {
    snapshots: DashMap<ConversationId, Snapshot>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot, or an empty one for unknown conversations.
    pub fn get(&self, conversation_id: ConversationId) -> Snapshot {
        self.snapshots
            .get(&conversation_id)
            .map(|entry| Arc::clone(entry.value()))
            .unwrap_or_default()
    }

    /// Replaces the conversation's snapshot wholesale.
    pub fn replace(&self, conversation_id: ConversationId, messages: Vec<Message>) {
        self.snapshots.insert(conversation_id, Arc::new(messages));
    }

    /// Creates an empty snapshot if the conversation has none yet.
    pub fn ensure(&self, conversation_id: ConversationId) {
        self.snapshots.entry(conversation_id).or_default();
    }

    /// Appends `message` unless a message with the same id is already cached.
    ///
    /// Unconfirmed messages (no id) cannot be deduplicated and are always
    /// appended. Returns whether the snapshot changed.
    pub fn append_if_absent(&self, conversation_id: ConversationId, message: Message) -> bool {
        let mut entry = self.snapshots.entry(conversation_id).or_default();
        if let Some(id) = message.id
            && entry.iter().any(|m| m.id == Some(id))
        {
            return false;
        }
        Arc::make_mut(entry.value_mut()).push(message);
        true
    }

    /// Drops the conversation's snapshot.
    pub fn remove(&self, conversation_id: ConversationId) -> Option<Snapshot> {
        self.snapshots.remove(&conversation_id).map(|(_, s)| s)
    }

    /// Drops every snapshot.
    pub fn clear(&self) {
        self.snapshots.clear();
    }

    pub fn contains(&self, conversation_id: ConversationId) -> bool {
        self.snapshots.contains_key(&conversation_id)
    }

    /// Number of conversations with a cached snapshot.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use parley_core::types::{MessageId, UserId};

    const CONV: ConversationId = ConversationId(1);

    fn msg(id: Option<i64>) -> Message {
        Message {
            id: id.map(MessageId),
            conversation_id: CONV,
            sender_id: UserId(1),
            sender_name: None,
            content: "hello".into(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            read_at: None,
        }
    }

    #[test]
    fn get_unknown_conversation_is_empty() {
        let store = MessageStore::new();
        assert!(store.get(CONV).is_empty());
        assert!(!store.contains(CONV));
    }

    #[test]
    fn replace_swaps_whole_snapshot() {
        let store = MessageStore::new();
        store.replace(CONV, vec![msg(Some(1)), msg(Some(2))]);
        let before = store.get(CONV);

        store.replace(CONV, vec![msg(Some(3))]);

        // A reader holding the old snapshot still sees it intact.
        assert_eq!(before.len(), 2);
        assert_eq!(store.get(CONV).len(), 1);
        assert_eq!(store.get(CONV)[0].id, Some(MessageId(3)));
    }

    #[test]
    fn append_if_absent_deduplicates_by_id() {
        let store = MessageStore::new();
        store.replace(CONV, vec![msg(Some(1))]);

        assert!(!store.append_if_absent(CONV, msg(Some(1))));
        assert!(store.append_if_absent(CONV, msg(Some(2))));
        assert_eq!(store.get(CONV).len(), 2);
    }

    #[test]
    fn append_does_not_disturb_held_snapshot() {
        let store = MessageStore::new();
        store.replace(CONV, vec![msg(Some(1))]);
        let held = store.get(CONV);

        store.append_if_absent(CONV, msg(Some(2)));

        assert_eq!(held.len(), 1);
        assert_eq!(store.get(CONV).len(), 2);
    }

    #[test]
    fn unconfirmed_messages_always_append() {
        let store = MessageStore::new();
        assert!(store.append_if_absent(CONV, msg(None)));
        assert!(store.append_if_absent(CONV, msg(None)));
        assert_eq!(store.get(CONV).len(), 2);
    }

    #[test]
    fn ensure_remove_and_clear() {
        let store = MessageStore::new();
        store.ensure(CONV);
        store.ensure(ConversationId(2));
        assert!(store.contains(CONV));
        assert_eq!(store.len(), 2);

        assert!(store.remove(CONV).is_some());
        assert!(!store.contains(CONV));

        store.clear();
        assert!(store.is_empty());
    }
}
