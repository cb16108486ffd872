// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diff engine comparing a fetched message list against the cached snapshot.
//!
//! Each successful fetch is authoritative: the merged snapshot is exactly
//! the fetched list, and only two transitions produce events:
//!
//! - an id not present in the previous snapshot (new message);
//! - a known id whose read timestamp went from null to non-null (read receipt).
//!
//! Content edits, sender renames and read-to-unread transitions are not
//! updates.

use std::collections::{HashMap, HashSet};

use parley_core::types::{Message, MessageId, UpdateEvent};

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The new snapshot. Always identical to the fetched list.
    pub merged: Vec<Message>,
    /// Detected updates, in fetch-list order.
    pub events: Vec<UpdateEvent>,
}

/// Compares `fetched` against `previous` and classifies the differences.
///
/// If an id repeats inside `previous`, the last copy is the one compared
/// against. If an id repeats inside `fetched`, only its first occurrence
/// can produce an event. Messages without an id are always new.
pub fn reconcile(previous: &[Message], fetched: Vec<Message>) -> Reconciliation {
    let known: HashMap<MessageId, &Message> = previous
        .iter()
        .filter_map(|m| m.id.map(|id| (id, m)))
        .collect();

    let mut seen = HashSet::with_capacity(fetched.len());
    let mut events = Vec::new();

    for message in &fetched {
        let Some(id) = message.id else {
            events.push(UpdateEvent::new_message(message.clone()));
            continue;
        };

        if !seen.insert(id) {
            continue;
        }

        match known.get(&id) {
            None => events.push(UpdateEvent::new_message(message.clone())),
            Some(prev) if !prev.is_read() && message.is_read() => {
                events.push(UpdateEvent::read_receipt(message.clone()));
            }
            Some(_) => {}
        }
    }

    Reconciliation {
        merged: fetched,
        events,
    }
}

/// Whether creation timestamps are non-decreasing when ordered by id.
///
/// Only confirmed messages take part. Used as a diagnostic; nothing in the
/// engine depends on the answer.
pub fn timestamps_monotonic(messages: &[Message]) -> bool {
    let mut stamped: Vec<_> = messages
        .iter()
        .filter_map(|m| m.id.map(|id| (id, m.created_at)))
        .collect();
    stamped.sort_by_key(|(id, _)| *id);
    stamped.windows(2).all(|pair| pair[0].1 <= pair[1].1)
}
