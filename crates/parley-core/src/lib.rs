// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley chat engine.
//!
//! This crate provides the domain types, the error type, and the traits
//! for the engine's external collaborators (authentication and
//! transport). It performs no I/O itself.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParleyError;
pub use traits::{AuthProvider, ChatTransport};
pub use types::{
    ConnectionStatus, ConversationId, ConversationSummary, Message, MessageId, OutgoingMessage,
    PostMessageRequest, UpdateEvent, UpdateKind, UserId,
};
