// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley chat engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Client process settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Chat server endpoint settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Static credentials for the CLI.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Poll loop settings.
    #[serde(default)]
    pub poll: PollConfig,

    /// Outgoing message settings.
    #[serde(default)]
    pub send: SendConfig,

    /// Read receipt settings.
    #[serde(default)]
    pub read_receipts: ReadReceiptConfig,
}

/// Client process configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Chat server endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL of the chat REST API, e.g. `https://chat.example.com/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Static credentials. `None` means signed out.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Bearer token sent as `Authorization: Bearer <token>`.
    #[serde(default)]
    pub token: Option<String>,

    /// Id of the signed-in user.
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Poll loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollConfig {
    /// Interval between fetches of a subscribed conversation, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_interval_ms() -> u64 {
    5000
}

/// Outgoing message configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SendConfig {
    /// Maximum message length in characters, after trimming.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            max_content_length: default_max_content_length(),
        }
    }
}

fn default_max_content_length() -> usize {
    4000
}

/// Read receipt configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReadReceiptConfig {
    /// Mark the conversation read when a poll detects a message from the other party.
    #[serde(default = "default_auto_mark_read")]
    pub auto_mark_read: bool,

    /// Quiet period that collapses bursts of mark-read requests, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ReadReceiptConfig {
    fn default() -> Self {
        Self {
            auto_mark_read: default_auto_mark_read(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl ReadReceiptConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_auto_mark_read() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ParleyConfig::default();
        assert_eq!(config.client.log_level, "info");
        assert_eq!(config.server.base_url, "http://localhost:8080/api");
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.poll.interval(), Duration::from_millis(5000));
        assert_eq!(config.send.max_content_length, 4000);
        assert!(config.read_receipts.auto_mark_read);
        assert_eq!(config.read_receipts.debounce(), Duration::from_secs(1));
        assert!(config.auth.token.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: ParleyConfig = toml::from_str("[poll]\ninterval_ms = 250\n").unwrap();
        assert_eq!(config.poll.interval_ms, 250);
        assert_eq!(config.send.max_content_length, 4000);
    }

    #[test]
    fn unknown_poll_key_is_rejected() {
        let result = toml::from_str::<ParleyConfig>("[poll]\ninterval = 250\n");
        assert!(result.is_err());
    }
}
