// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits for the engine's external collaborators.
//!
//! Both use `#[async_trait]` where they suspend, so they can be held as
//! `Arc<dyn ...>` by the engine.

pub mod auth;
pub mod transport;

pub use auth::AuthProvider;
pub use transport::ChatTransport;
