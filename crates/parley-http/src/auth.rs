// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static credentials loaded from configuration.

use parley_config::model::AuthConfig;
use parley_core::AuthProvider;
use parley_core::types::UserId;
use secrecy::{ExposeSecret, SecretString};

/// An [`AuthProvider`] holding a fixed token and user id.
///
/// Used by the CLI, where the credential comes from `[auth]` or
/// `PARLEY_AUTH_TOKEN` instead of an interactive login.
#[derive(Debug)]
pub struct StaticAuth {
    token: Option<SecretString>,
    user_id: Option<UserId>,
}

impl StaticAuth {
    pub fn new(token: Option<String>, user_id: Option<UserId>) -> Self {
        Self {
            token: token.map(SecretString::from),
            user_id,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.token.clone(), config.user_id.map(UserId))
    }
}

impl AuthProvider for StaticAuth {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_owned()))
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.user_id
    }
}
