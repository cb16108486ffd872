// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley configuration: a `parley.toml` model with unknown keys rejected,
//! layered over compiled defaults and overridden by `PARLEY_*` variables.
//!
//! Every `load_and_validate*` entry point returns either a checked
//! [`ParleyConfig`] or the full list of [`ConfigError`] diagnostics, ready
//! for [`render_errors`].
//!
//! # Usage
//!
//! ```no_run
//! use parley_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("polling every {} ms", config.poll.interval_ms);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ParleyConfig;

use std::path::{Path, PathBuf};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Figment errors become miette diagnostics pointing into whichever of the
/// standard config files exist.
pub fn load_and_validate() -> Result<ParleyConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || read_sources(&loader::config_files()))
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<ParleyConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_sources(&[path.to_path_buf()])
    })
}

/// Load configuration from a specific TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ParleyConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Runs validation on a loaded config, or converts the load error using the
/// sources that may have produced it. Sources are only read on failure.
fn checked(
    loaded: Result<ParleyConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<ParleyConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Reads the given files, keyed by the absolute path figment reports for them.
fn read_sources(paths: &[PathBuf]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(path).ok()?;
            let name = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            Some((name.display().to_string(), content))
        })
        .collect()
}
