// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Debounced read receipts.
//!
//! Each subscription owns a [`ReadMarker`] task. Requests reset a quiet
//! period; once it elapses with no further requests, a single mark-read call
//! goes out. A request arriving while that call is in flight is remembered
//! and triggers one more round.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parley_core::types::ConversationId;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::engine::EngineInner;

#[derive(Debug)]
pub(crate) struct ReadMarker {
    notify: Arc<Notify>,
}

impl ReadMarker {
    pub(crate) fn spawn(
        engine: Weak<EngineInner>,
        conversation_id: ConversationId,
        debounce: Duration,
        token: CancellationToken,
    ) -> Self {
        let notify = Arc::new(Notify::new());
        tokio::spawn(run_read_marker(
            engine,
            conversation_id,
            debounce,
            Arc::clone(&notify),
            token,
        ));
        Self { notify }
    }

    pub(crate) fn request(&self) {
        self.notify.notify_one();
    }
}

async fn run_read_marker(
    engine: Weak<EngineInner>,
    conversation_id: ConversationId,
    debounce: Duration,
    notify: Arc<Notify>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = notify.notified() => {}
        }

        // Quiet period, restarted by every further request.
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = notify.notified() => continue,
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let Some(inner) = engine.upgrade() else {
            return;
        };
        debug!(conversation_id = %conversation_id, "sending debounced mark-read");
        if let Err(e) = inner.mark_read(conversation_id).await {
            warn!(conversation_id = %conversation_id, error = %e, "debounced mark-read failed");
        }
    }
}
