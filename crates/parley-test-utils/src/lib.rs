// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley.
//!
//! Provides an in-memory [`MockTransport`] standing in for the chat server,
//! a [`MockAuth`] identity and message [`fixtures`].

pub mod fixtures;
pub mod mock_auth;
pub mod mock_transport;

pub use mock_auth::MockAuth;
pub use mock_transport::MockTransport;
