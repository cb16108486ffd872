// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory chat server for deterministic engine tests.
//!
//! `MockTransport` implements `ChatTransport` over per-conversation message
//! lists that tests mutate directly. Fetches capture server state when they
//! start, then wait on an optional gate, so tests can hold a fetch in flight
//! and return stale data after the server has moved on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parley_core::ChatTransport;
use parley_core::ParleyError;
use parley_core::types::{
    ConversationId, ConversationSummary, Message, MessageId, PostMessageRequest,
};
use tokio::sync::{Mutex, watch};

/// First id handed out to posted messages.
pub const FIRST_POSTED_ID: i64 = 1000;

pub struct MockTransport {
    messages: Mutex<HashMap<ConversationId, Vec<Message>>>,
    conversations: Mutex<Vec<ConversationSummary>>,
    posted: Mutex<Vec<PostMessageRequest>>,
    mark_read_calls: Mutex<Vec<ConversationId>>,
    fail_fetches: AtomicBool,
    fail_posts: AtomicBool,
    fail_lists: AtomicBool,
    next_id: AtomicI64,
    /// `true` while fetches are held.
    gate: watch::Sender<bool>,
    fetches: watch::Sender<usize>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            conversations: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            mark_read_calls: Mutex::new(Vec::new()),
            fail_fetches: AtomicBool::new(false),
            fail_posts: AtomicBool::new(false),
            fail_lists: AtomicBool::new(false),
            next_id: AtomicI64::new(FIRST_POSTED_ID),
            gate: watch::channel(false).0,
            fetches: watch::channel(0).0,
        }
    }

    /// Replaces the server's message list for a conversation.
    pub async fn set_messages(&self, conversation_id: ConversationId, messages: Vec<Message>) {
        self.messages.lock().await.insert(conversation_id, messages);
    }

    /// Appends a message to the server's list.
    pub async fn push_message(&self, message: Message) {
        self.messages
            .lock()
            .await
            .entry(message.conversation_id)
            .or_default()
            .push(message);
    }

    /// Marks one server-side message read at the given offset from the
    /// fixture epoch.
    pub async fn set_read(&self, conversation_id: ConversationId, id: MessageId, secs: i64) {
        if let Some(list) = self.messages.lock().await.get_mut(&conversation_id) {
            for message in list.iter_mut().filter(|m| m.id == Some(id)) {
                message.read_at = Some(crate::fixtures::epoch() + chrono::Duration::seconds(secs));
            }
        }
    }

    pub async fn set_conversations(&self, conversations: Vec<ConversationSummary>) {
        *self.conversations.lock().await = conversations;
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_posts(&self, fail: bool) {
        self.fail_posts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent fetches block until [`release_fetches`](Self::release_fetches).
    pub fn hold_fetches(&self) {
        self.gate.send_replace(true);
    }

    pub fn release_fetches(&self) {
        self.gate.send_replace(false);
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> usize {
        *self.fetches.borrow()
    }

    /// Waits until at least `n` fetches have started.
    pub async fn wait_for_fetches(&self, n: usize) {
        let mut rx = self.fetches.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    pub async fn posted(&self) -> Vec<PostMessageRequest> {
        self.posted.lock().await.clone()
    }

    pub async fn mark_read_calls(&self) -> Vec<ConversationId> {
        self.mark_read_calls.lock().await.clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ParleyError> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(ParleyError::transport("mock list failure"));
        }
        Ok(self.conversations.lock().await.clone())
    }

    async fn fetch_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ParleyError> {
        let snapshot = self
            .messages
            .lock()
            .await
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default();
        let failing = self.fail_fetches.load(Ordering::SeqCst);
        self.fetches.send_modify(|count| *count += 1);

        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|held| !*held).await;

        if failing {
            return Err(ParleyError::transport("mock fetch failure"));
        }
        Ok(snapshot)
    }

    async fn post_message(&self, request: &PostMessageRequest) -> Result<Message, ParleyError> {
        if self.fail_posts.load(Ordering::SeqCst) {
            return Err(ParleyError::transport("mock post failure"));
        }
        self.posted.lock().await.push(request.clone());

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = Message {
            id: Some(MessageId(id)),
            conversation_id: request.conversation_id,
            sender_id: request.sender_id,
            sender_name: None,
            content: request.content.clone(),
            created_at: Utc::now(),
            read_at: None,
        };
        self.push_message(message.clone()).await;
        Ok(message)
    }

    async fn mark_read(&self, conversation_id: ConversationId) -> Result<(), ParleyError> {
        self.mark_read_calls.lock().await.push(conversation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use parley_core::types::UserId;

    const CONV: ConversationId = ConversationId(3);

    #[tokio::test]
    async fn fetch_returns_server_state() {
        let transport = MockTransport::new();
        transport
            .set_messages(CONV, vec![fixtures::message(3, 1, 2)])
            .await;

        let fetched = transport.fetch_messages(CONV).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(transport.fetch_count(), 1);
    }

    #[tokio::test]
    async fn post_assigns_ids_and_updates_server() {
        let transport = MockTransport::new();
        let request = PostMessageRequest {
            conversation_id: CONV,
            sender_id: UserId(1),
            content: "hi".into(),
        };

        let first = transport.post_message(&request).await.unwrap();
        let second = transport.post_message(&request).await.unwrap();

        assert_eq!(first.id, Some(MessageId(FIRST_POSTED_ID)));
        assert_eq!(second.id, Some(MessageId(FIRST_POSTED_ID + 1)));
        assert_eq!(transport.fetch_messages(CONV).await.unwrap().len(), 2);
        assert_eq!(transport.posted().await.len(), 2);
    }

    #[tokio::test]
    async fn held_fetch_returns_state_from_when_it_started() {
        let transport = std::sync::Arc::new(MockTransport::new());
        transport.hold_fetches();

        let pending = tokio::spawn({
            let transport = transport.clone();
            async move { transport.fetch_messages(CONV).await }
        });
        transport.wait_for_fetches(1).await;
        transport.push_message(fixtures::message(3, 1, 2)).await;
        transport.release_fetches();

        assert!(pending.await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_flags_apply() {
        let transport = MockTransport::new();
        transport.fail_fetches(true);
        transport.fail_lists(true);
        assert!(transport.fetch_messages(CONV).await.is_err());
        assert!(transport.list_conversations().await.is_err());
    }
}
