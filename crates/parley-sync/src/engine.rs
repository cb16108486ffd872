// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat synchronization engine.
//!
//! [`ChatEngine`] is a cheap cloneable handle. It owns the message store,
//! the connection status and one [`Subscription`] per watched conversation.
//! Each subscription runs a poll loop task and a read-marker task, both
//! holding only a weak reference back to the engine so dropping the last
//! handle shuts everything down.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parley_config::model::ParleyConfig;
use parley_core::types::{
    ConnectionStatus, ConversationId, ConversationSummary, Message, MessageId, OutgoingMessage,
};
use parley_core::{AuthProvider, ChatTransport, ParleyError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::channel::{UpdateChannel, UpdateReceiver};
use crate::poller::run_poll_loop;
use crate::read::ReadMarker;
use crate::status::ConnectionState;
use crate::store::{MessageStore, Snapshot};

/// Tunables extracted from [`ParleyConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    pub max_content_length: usize,
    pub auto_mark_read: bool,
    pub read_debounce: Duration,
}

impl EngineSettings {
    pub fn from_config(config: &ParleyConfig) -> Self {
        Self {
            poll_interval: config.poll.interval(),
            max_content_length: config.send.max_content_length,
            auto_mark_read: config.read_receipts.auto_mark_read,
            read_debounce: config.read_receipts.debounce(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&ParleyConfig::default())
    }
}

/// Conversation metadata plus its current history, as returned by
/// [`ChatEngine::load_conversation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationView {
    pub summary: ConversationSummary,
    pub messages: Vec<Message>,
}

/// Live state for one watched conversation.
#[derive(Debug)]
pub(crate) struct Subscription {
    /// Bumped on every (re)subscribe. Poll results tagged with an older
    /// generation are discarded.
    pub(crate) generation: u64,
    /// Cancelled on unsubscribe. Parent of `poll_token`.
    lifetime: CancellationToken,
    /// Cancelled when the poll loop is replaced.
    poll_token: CancellationToken,
    pub(crate) channel: UpdateChannel,
    /// Ids announced by the send path that no fetch has returned yet.
    pub(crate) announced: HashSet<MessageId>,
    pub(crate) read_marker: ReadMarker,
}

impl Subscription {
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && !self.poll_token.is_cancelled()
    }

    fn shutdown(&mut self) {
        self.lifetime.cancel();
        self.channel.close();
    }
}

pub(crate) struct EngineInner {
    pub(crate) transport: Arc<dyn ChatTransport>,
    pub(crate) auth: Arc<dyn AuthProvider>,
    pub(crate) settings: EngineSettings,
    pub(crate) store: MessageStore,
    pub(crate) status: ConnectionState,
    pub(crate) subscriptions: DashMap<ConversationId, Subscription>,
    generations: AtomicU64,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        for mut entry in self.subscriptions.iter_mut() {
            entry.value_mut().shutdown();
        }
    }
}

impl EngineInner {
    pub(crate) async fn mark_read(&self, conversation_id: ConversationId) -> Result<(), ParleyError> {
        match self.transport.mark_read(conversation_id).await {
            Ok(()) => {
                self.status.mark_success();
                debug!(conversation_id = %conversation_id, "conversation marked read");
                Ok(())
            }
            Err(e) => {
                warn!(conversation_id = %conversation_id, error = %e, "mark-read failed");
                self.status.mark_failure();
                Err(e)
            }
        }
    }
}

/// Handle to the synchronization engine.
///
/// Spawns background tasks, so [`subscribe`](Self::subscribe) and
/// [`reconnect`](Self::reconnect) must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct ChatEngine {
    pub(crate) inner: Arc<EngineInner>,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine")
            .field("status", &self.inner.status.current())
            .field("subscriptions", &self.inner.subscriptions.len())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl ChatEngine {
    pub fn new(
        config: &ParleyConfig,
        transport: Arc<dyn ChatTransport>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self::with_settings(EngineSettings::from_config(config), transport, auth)
    }

    pub fn with_settings(
        settings: EngineSettings,
        transport: Arc<dyn ChatTransport>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                transport,
                auth,
                settings,
                store: MessageStore::new(),
                status: ConnectionState::new(),
                subscriptions: DashMap::new(),
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    /// Verifies the signed-in identity and that the backend is reachable.
    pub async fn connect(&self) -> Result<(), ParleyError> {
        let inner = &self.inner;
        inner.status.wake();
        let Some(user_id) = inner.auth.current_user_id() else {
            inner.status.mark_failure();
            return Err(ParleyError::Authentication(
                "no signed-in user; sign in before connecting".into(),
            ));
        };

        match inner.transport.list_conversations().await {
            Ok(conversations) => {
                inner.status.mark_success();
                info!(
                    user_id = %user_id,
                    conversations = conversations.len(),
                    "connected to chat backend"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "connection probe failed");
                inner.status.mark_failure();
                Err(e)
            }
        }
    }

    /// Starts watching a conversation and returns a receiver for its updates.
    ///
    /// Re-subscribing to an already watched conversation replaces its poll
    /// loop but keeps its snapshot and update channel: existing receivers
    /// stay attached and the returned receiver joins them.
    pub fn subscribe(&self, conversation_id: ConversationId) -> UpdateReceiver {
        let inner = &self.inner;
        inner.status.wake();
        let generation = inner.generations.fetch_add(1, Ordering::Relaxed) + 1;

        let (receiver, poll_token) = match inner.subscriptions.entry(conversation_id) {
            Entry::Occupied(mut occupied) => {
                let sub = occupied.get_mut();
                sub.poll_token.cancel();
                sub.poll_token = sub.lifetime.child_token();
                sub.generation = generation;
                debug!(
                    conversation_id = %conversation_id,
                    generation,
                    "replacing poll loop for existing subscription"
                );
                (sub.channel.subscribe(), sub.poll_token.clone())
            }
            Entry::Vacant(vacant) => {
                let lifetime = CancellationToken::new();
                let poll_token = lifetime.child_token();
                let mut channel = UpdateChannel::new(conversation_id);
                let receiver = channel.subscribe();
                let read_marker = ReadMarker::spawn(
                    Arc::downgrade(inner),
                    conversation_id,
                    inner.settings.read_debounce,
                    lifetime.clone(),
                );
                inner.store.ensure(conversation_id);
                vacant.insert(Subscription {
                    generation,
                    lifetime,
                    poll_token: poll_token.clone(),
                    channel,
                    announced: HashSet::new(),
                    read_marker,
                });
                info!(conversation_id = %conversation_id, "subscribed to conversation");
                (receiver, poll_token)
            }
        };

        tokio::spawn(run_poll_loop(
            Arc::downgrade(inner),
            conversation_id,
            generation,
            inner.settings.poll_interval,
            poll_token,
        ));

        receiver
    }

    /// Stops watching a conversation: cancels its poll loop, completes its
    /// update stream and drops its snapshot. Returns `false` if it was not
    /// subscribed.
    pub fn unsubscribe(&self, conversation_id: ConversationId) -> bool {
        let inner = &self.inner;
        let Some((_, mut sub)) = inner.subscriptions.remove(&conversation_id) else {
            return false;
        };
        sub.shutdown();
        inner.store.remove(conversation_id);
        info!(conversation_id = %conversation_id, "unsubscribed from conversation");
        true
    }

    /// Re-enters `Connecting` and restarts the conversation's poll loop.
    pub fn reconnect(&self, conversation_id: ConversationId) -> UpdateReceiver {
        info!(conversation_id = %conversation_id, "reconnecting");
        self.inner.status.set(ConnectionStatus::Connecting);
        self.subscribe(conversation_id)
    }

    /// Unsubscribes from everything, clears the store and parks the status in
    /// `Disconnected`.
    pub fn teardown(&self) {
        let inner = &self.inner;
        let mut closed = 0usize;
        inner.subscriptions.retain(|_, sub| {
            sub.shutdown();
            closed += 1;
            false
        });
        inner.store.clear();
        inner.status.set(ConnectionStatus::Disconnected);
        info!(subscriptions = closed, "engine torn down");
    }

    /// Lists the signed-in user's conversations.
    pub async fn get_my_conversations(&self) -> Result<Vec<ConversationSummary>, ParleyError> {
        match self.inner.transport.list_conversations().await {
            Ok(conversations) => {
                self.inner.status.mark_success();
                Ok(conversations)
            }
            Err(e) => {
                warn!(error = %e, "listing conversations failed");
                self.inner.status.mark_failure();
                Err(e)
            }
        }
    }

    /// Loads a conversation's metadata and full history.
    ///
    /// Failures are wrapped in [`ParleyError::Load`] and leave the connection
    /// status alone; they are reported to the caller, not to subscribers.
    pub async fn load_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<ConversationView, ParleyError> {
        let wrap = |source: ParleyError| ParleyError::Load {
            conversation_id,
            source: Box::new(source),
        };

        let conversations = self
            .inner
            .transport
            .list_conversations()
            .await
            .map_err(wrap)?;
        let summary = conversations
            .into_iter()
            .find(|c| c.conversation_id == conversation_id)
            .ok_or_else(|| wrap(ParleyError::ConversationNotFound(conversation_id)))?;
        let messages = self
            .inner
            .transport
            .fetch_messages(conversation_id)
            .await
            .map_err(wrap)?;

        debug!(
            conversation_id = %conversation_id,
            messages = messages.len(),
            "conversation loaded"
        );
        Ok(ConversationView { summary, messages })
    }

    /// Sends a message. See [`crate::send`] for validation rules.
    pub async fn send(&self, message: OutgoingMessage) -> Result<Message, ParleyError> {
        self.inner.send(message).await
    }

    /// Marks every message in the conversation as read, immediately.
    pub async fn mark_read(&self, conversation_id: ConversationId) -> Result<(), ParleyError> {
        self.inner.mark_read(conversation_id).await
    }

    /// Schedules a debounced mark-read for a subscribed conversation.
    ///
    /// Bursts of requests within the debounce window collapse into one call.
    /// Returns `false` if the conversation is not subscribed.
    pub fn request_mark_read(&self, conversation_id: ConversationId) -> bool {
        match self.inner.subscriptions.get(&conversation_id) {
            Some(sub) => {
                sub.read_marker.request();
                true
            }
            None => false,
        }
    }

    /// Current cached snapshot; empty if the conversation is not cached.
    pub fn snapshot(&self, conversation_id: ConversationId) -> Snapshot {
        self.inner.store.get(conversation_id)
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.inner.status.current()
    }

    /// Observes connection status transitions.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.subscribe()
    }

    pub fn is_subscribed(&self, conversation_id: ConversationId) -> bool {
        self.inner.subscriptions.contains_key(&conversation_id)
    }

    /// Conversations currently being watched, in ascending id order.
    pub fn subscriptions(&self) -> Vec<ConversationId> {
        let mut ids: Vec<_> = self.inner.subscriptions.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }
}
