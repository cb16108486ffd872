// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport for the Parley chat engine.
//!
//! Implements [`ChatTransport`](parley_core::ChatTransport) over the chat
//! server's JSON REST API with reqwest, plus a static
//! [`AuthProvider`](parley_core::AuthProvider) fed from configuration.

pub mod auth;
pub mod client;

pub use auth::StaticAuth;
pub use client::HttpTransport;
