// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed identity for tests.

use parley_core::AuthProvider;
use parley_core::types::UserId;
use secrecy::SecretString;

#[derive(Debug, Clone, Default)]
pub struct MockAuth {
    user_id: Option<UserId>,
}

impl MockAuth {
    /// A signed-in user with a dummy bearer token.
    pub fn signed_in(user_id: i64) -> Self {
        Self {
            user_id: Some(UserId(user_id)),
        }
    }

    /// No identity and no token.
    pub fn signed_out() -> Self {
        Self::default()
    }
}

impl AuthProvider for MockAuth {
    fn bearer_token(&self) -> Option<SecretString> {
        self.user_id
            .map(|id| SecretString::from(format!("test-token-{id}")))
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.user_id
    }
}
