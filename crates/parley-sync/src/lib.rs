// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling-based chat synchronization for Parley.
//!
//! The engine keeps one snapshot per watched conversation, polls the
//! server on a fixed interval and diffs each fetch against the snapshot.
//! New messages and read transitions are pushed to subscribers as
//! [`UpdateEvent`](parley_core::types::UpdateEvent)s.

pub mod channel;
pub mod engine;
mod poller;
mod read;
pub mod reconcile;
pub mod send;
pub mod status;
pub mod store;

pub use channel::{UpdateChannel, UpdateReceiver};
pub use engine::{ChatEngine, ConversationView, EngineSettings};
pub use reconcile::{Reconciliation, reconcile, timestamps_monotonic};
pub use status::ConnectionState;
pub use store::{MessageStore, Snapshot};
