// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation update fan-out.
//!
//! Each subscribed conversation owns one [`UpdateChannel`]. Every
//! [`UpdateReceiver`] gets its own unbounded `mpsc` queue, so a slow
//! consumer never loses events and never holds back the others. Closing
//! the channel drops every sender; receivers drain what is still queued
//! and then see end-of-stream.

use futures::Stream;
use parley_core::types::{ConversationId, UpdateEvent};
use tokio::sync::mpsc;
use tracing::debug;

/// Sending half of a conversation's update stream.
#[derive(Debug)]
pub struct UpdateChannel {
    conversation_id: ConversationId,
    /// `None` once closed.
    senders: Option<Vec<mpsc::UnboundedSender<UpdateEvent>>>,
}

impl UpdateChannel {
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            senders: Some(Vec::new()),
        }
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Attaches a new receiver. It observes events published from now on.
    ///
    /// A receiver attached to a closed channel ends immediately.
    pub fn subscribe(&mut self) -> UpdateReceiver {
        let (tx, receiver) = mpsc::unbounded_channel();
        if let Some(senders) = &mut self.senders {
            senders.push(tx);
        }
        UpdateReceiver {
            conversation_id: self.conversation_id,
            receiver,
        }
    }

    /// Queues an event for every attached receiver, in publish order.
    ///
    /// Receivers that were dropped are detached here. Returns `false` only
    /// if the channel is closed; publishing with no receivers is accepted
    /// and the event goes nowhere.
    pub fn publish(&mut self, event: UpdateEvent) -> bool {
        let Some(senders) = &mut self.senders else {
            debug!(
                conversation_id = %self.conversation_id,
                kind = %event.kind,
                "dropping update for closed channel"
            );
            return false;
        };

        let before = senders.len();
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        if senders.len() < before {
            debug!(
                conversation_id = %self.conversation_id,
                detached = before - senders.len(),
                "dropped receivers detached"
            );
        }
        if senders.is_empty() {
            debug!(
                conversation_id = %self.conversation_id,
                "no receivers attached, update dropped"
            );
        }
        true
    }

    /// Closes the channel. Idempotent.
    pub fn close(&mut self) {
        if self.senders.take().is_some() {
            debug!(conversation_id = %self.conversation_id, "update channel closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.senders.is_none()
    }

    /// Receivers still attached. Dropped receivers count until the next
    /// publish detaches them.
    pub fn receiver_count(&self) -> usize {
        self.senders
            .as_ref()
            .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
    }
}

/// Receiving half of a conversation's update stream.
#[derive(Debug)]
pub struct UpdateReceiver {
    conversation_id: ConversationId,
    receiver: mpsc::UnboundedReceiver<UpdateEvent>,
}

impl UpdateReceiver {
    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Waits for the next update. Returns `None` once the channel is closed
    /// and drained.
    pub async fn recv(&mut self) -> Option<UpdateEvent> {
        self.receiver.recv().await
    }

    /// Converts the receiver into a `Stream` of updates.
    pub fn into_stream(self) -> impl Stream<Item = UpdateEvent> + Send + 'static {
        futures::stream::unfold(self, |mut rx| async move {
            let event = rx.recv().await?;
            Some((event, rx))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use futures::StreamExt;
    use parley_core::types::{Message, MessageId, UpdateKind, UserId};

    const CONV: ConversationId = ConversationId(9);

    fn event(id: i64) -> UpdateEvent {
        UpdateEvent::new_message(Message {
            id: Some(MessageId(id)),
            conversation_id: CONV,
            sender_id: UserId(1),
            sender_name: None,
            content: format!("m{id}"),
            created_at: Utc::now(),
            read_at: None,
        })
    }

    #[tokio::test]
    async fn every_receiver_sees_every_event() {
        let mut channel = UpdateChannel::new(CONV);
        let mut a = channel.subscribe();
        let mut b = channel.subscribe();

        assert!(channel.publish(event(1)));

        assert_eq!(a.recv().await.unwrap().message.id, Some(MessageId(1)));
        assert_eq!(b.recv().await.unwrap().message.id, Some(MessageId(1)));
        assert_eq!(channel.receiver_count(), 2);
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let mut channel = UpdateChannel::new(CONV);
        let mut rx = channel.subscribe();
        channel.publish(event(1));
        channel.close();

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
        assert!(!channel.publish(event(2)));
        assert!(channel.is_closed());
    }

    #[tokio::test]
    async fn subscribe_after_close_ends_immediately() {
        let mut channel = UpdateChannel::new(CONV);
        channel.close();
        let mut rx = channel.subscribe();
        assert!(rx.recv().await.is_none());
        assert_eq!(channel.receiver_count(), 0);
    }

    #[tokio::test]
    async fn publish_without_receivers_is_accepted() {
        let mut channel = UpdateChannel::new(CONV);
        assert!(channel.publish(event(1)));
    }

    #[tokio::test]
    async fn unread_backlog_is_kept_in_order() {
        let mut channel = UpdateChannel::new(CONV);
        let mut rx = channel.subscribe();
        for id in 1..=1000 {
            assert!(channel.publish(event(id)));
        }
        channel.close();

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.extend(event.message.id.map(|id| id.0));
        }
        assert_eq!(received, (1..=1000).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn dropped_receiver_is_detached_on_publish() {
        let mut channel = UpdateChannel::new(CONV);
        let mut kept = channel.subscribe();
        drop(channel.subscribe());
        assert_eq!(channel.receiver_count(), 1);

        assert!(channel.publish(event(1)));
        assert_eq!(kept.recv().await.unwrap().message.id, Some(MessageId(1)));
        assert_eq!(channel.senders.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn stream_yields_until_closed() {
        let mut channel = UpdateChannel::new(CONV);
        let stream = channel.subscribe().into_stream();
        channel.publish(event(1));
        channel.publish(event(2));
        channel.close();

        let kinds: Vec<_> = stream.map(|e| (e.kind, e.message.id)).collect().await;
        assert_eq!(
            kinds,
            vec![
                (UpdateKind::NewMessage, Some(MessageId(1))),
                (UpdateKind::NewMessage, Some(MessageId(2))),
            ]
        );
    }
}
