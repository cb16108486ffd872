// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication collaborator.

use secrecy::SecretString;

use crate::types::UserId;

/// Supplies the bearer credential and identity of the signed-in user.
///
/// Credential storage and refresh live behind this trait; the engine
/// only reads the current values.
pub trait AuthProvider: Send + Sync + 'static {
    /// Returns the current bearer credential, or `None` when signed out.
    fn bearer_token(&self) -> Option<SecretString>;

    /// Returns the id of the signed-in user, used to stamp outgoing messages.
    fn current_user_id(&self) -> Option<UserId>;
}
