// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-interval poll loop for one subscribed conversation.
//!
//! The first fetch is issued immediately, then once per interval. A fetch
//! still in flight when the next tick fires is abandoned and replaced by a
//! fresh one, so at most one fetch per subscription is ever outstanding and
//! the newest request wins.

use std::sync::Weak;
use std::time::Duration;

use parley_core::ParleyError;
use parley_core::types::{ConversationId, Message, UpdateKind};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::engine::EngineInner;
use crate::reconcile::{Reconciliation, reconcile, timestamps_monotonic};

pub(crate) async fn run_poll_loop(
    engine: Weak<EngineInner>,
    conversation_id: ConversationId,
    generation: u64,
    period: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick_pending = false;

    debug!(conversation_id = %conversation_id, generation, "poll loop started");

    loop {
        if !tick_pending {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
        }
        tick_pending = false;

        let Some(transport) = engine.upgrade().map(|inner| inner.transport.clone()) else {
            break;
        };

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = transport.fetch_messages(conversation_id) => result,
            _ = ticker.tick() => {
                debug!(
                    conversation_id = %conversation_id,
                    "fetch still in flight at next tick, switching to latest"
                );
                tick_pending = true;
                continue;
            }
        };

        let Some(inner) = engine.upgrade() else {
            break;
        };
        inner.apply_poll_result(conversation_id, generation, result);
    }

    debug!(conversation_id = %conversation_id, generation, "poll loop stopped");
}

impl EngineInner {
    /// Folds one fetch outcome into the store, channel and status.
    ///
    /// Runs entirely under the subscription's map entry, so it is atomic with
    /// respect to unsubscribe, resubscribe and the send path.
    pub(crate) fn apply_poll_result(
        &self,
        conversation_id: ConversationId,
        generation: u64,
        result: Result<Vec<Message>, ParleyError>,
    ) {
        let Some(mut sub) = self.subscriptions.get_mut(&conversation_id) else {
            debug!(conversation_id = %conversation_id, "discarding result for closed subscription");
            return;
        };
        if !sub.is_current(generation) {
            debug!(
                conversation_id = %conversation_id,
                generation,
                current = sub.generation,
                "discarding result from replaced poll loop"
            );
            return;
        }

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(conversation_id = %conversation_id, error = %e, "poll fetch failed");
                self.status.mark_failure();
                return;
            }
        };
        self.status.mark_success();

        if !timestamps_monotonic(&fetched) {
            warn!(
                conversation_id = %conversation_id,
                "fetched message timestamps are not monotonic by id"
            );
        }

        let previous = self.store.get(conversation_id);
        let Reconciliation { merged, events } = reconcile(&previous, fetched);

        // Messages the send path already announced are not new to subscribers.
        let events: Vec<_> = events
            .into_iter()
            .filter(|event| {
                event.kind != UpdateKind::NewMessage
                    || event.message.id.is_none_or(|id| !sub.announced.remove(&id))
            })
            .collect();
        sub.announced
            .retain(|id| !merged.iter().any(|m| m.id == Some(*id)));

        let total = merged.len();
        self.store.replace(conversation_id, merged);

        let me = self.auth.current_user_id();
        let incoming = events
            .iter()
            .any(|e| e.kind == UpdateKind::NewMessage && Some(e.message.sender_id) != me);
        let published = events.len();
        for event in events {
            sub.channel.publish(event);
        }

        if incoming && self.settings.auto_mark_read {
            sub.read_marker.request();
        }

        debug!(
            conversation_id = %conversation_id,
            messages = total,
            events = published,
            "poll applied"
        );
    }
}
