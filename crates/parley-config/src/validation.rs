// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes, minimum poll intervals, and non-zero limits.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

/// Poll intervals below this would hammer the server in a near busy-loop.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.server.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.base_url must not be empty".to_string(),
        });
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("server.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "server.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.poll.interval_ms < MIN_POLL_INTERVAL_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "poll.interval_ms must be at least {MIN_POLL_INTERVAL_MS}, got {}",
                config.poll.interval_ms
            ),
        });
    }

    if config.send.max_content_length == 0 {
        errors.push(ConfigError::Validation {
            message: "send.max_content_length must be at least 1".to_string(),
        });
    }

    let level = config.client.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "client.log_level `{}` is not one of: {}",
                config.client.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(token) = &config.auth.token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "auth.token must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
