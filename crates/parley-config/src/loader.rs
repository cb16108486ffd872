// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./parley.toml` > `~/.config/parley/parley.toml` > `/etc/parley/parley.toml`
//! with environment variable overrides via `PARLEY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ParleyConfig;

/// Top-level sections, used to split `PARLEY_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &["client", "server", "auth", "poll", "send", "read_receipts"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/parley/parley.toml` (system-wide)
/// 3. `~/.config/parley/parley.toml` (user XDG config)
/// 4. `./parley.toml` (local directory)
/// 5. `PARLEY_*` environment variables
pub fn load_config() -> Result<ParleyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn config_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from("/etc/parley/parley.toml")];
    files.extend(dirs::config_dir().map(|d| d.join("parley/parley.toml")));
    files.push(PathBuf::from("parley.toml"));
    files
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    config_files()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(ParleyConfig::default())),
            |figment, file| figment.merge(Toml::file(file)),
        )
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `PARLEY_POLL_INTERVAL_MS` must map to `poll.interval_ms`,
/// not `poll.interval.ms`.
fn env_provider() -> Env {
    Env::prefixed("PARLEY_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped variable name to a dotted config path.
fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section)
            && let Some(field) = rest.strip_prefix('_')
        {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("poll_interval_ms"), "poll.interval_ms");
        assert_eq!(map_env_key("auth_token"), "auth.token");
        assert_eq!(map_env_key("auth_user_id"), "auth.user_id");
        assert_eq!(map_env_key("server_base_url"), "server.base_url");
        assert_eq!(
            map_env_key("read_receipts_debounce_ms"),
            "read_receipts.debounce_ms"
        );
        assert_eq!(map_env_key("client_log_level"), "client.log_level");
    }

    #[test]
    fn unknown_env_section_is_left_alone() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }

    #[test]
    fn local_file_has_highest_precedence() {
        let files = config_files();
        assert_eq!(files.first(), Some(&PathBuf::from("/etc/parley/parley.toml")));
        assert_eq!(files.last(), Some(&PathBuf::from("parley.toml")));
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("parley.toml", "[poll]\ninterval_ms = 2000\n")?;
            jail.set_env("PARLEY_POLL_INTERVAL_MS", "750");
            jail.set_env("PARLEY_AUTH_TOKEN", "secret-token");

            let config = load_config_from_path(Path::new("parley.toml"))?;
            assert_eq!(config.poll.interval_ms, 750);
            assert_eq!(config.auth.token.as_deref(), Some("secret-token"));
            Ok(())
        });
    }
}
