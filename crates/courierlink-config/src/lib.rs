// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for courierlink.
//!
//! TOML configuration with strict validation (`deny_unknown_fields`), XDG
//! file hierarchy lookup, `COURIERLINK_*` environment overrides, and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use courierlink_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CourierlinkConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `CourierlinkConfig` or every diagnostic found.
pub fn load_and_validate() -> Result<CourierlinkConfig, Vec<ConfigError>> {
    let sources = loader::search_paths()
        .iter()
        .filter_map(|path| read_source(path))
        .collect::<Vec<_>>();
    checked(loader::load_config(), &sources)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<CourierlinkConfig, Vec<ConfigError>> {
    let sources = read_source(path).into_iter().collect::<Vec<_>>();
    checked(loader::load_config_from_path(path), &sources)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<CourierlinkConfig, Vec<ConfigError>> {
    let sources = [("<inline>".to_string(), toml_content.to_string())];
    checked(loader::load_config_from_str(toml_content), &sources)
}

/// Render the effective configuration as TOML.
pub fn render_toml(config: &CourierlinkConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

/// Validate a loaded config, or turn the load failure into diagnostics
/// pointing into `sources`.
fn checked(
    loaded: Result<CourierlinkConfig, figment::Error>,
    sources: &[(String, String)],
) -> Result<CourierlinkConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, sources))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// A config file's contents keyed by the path figment reports for it.
fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let shown = if path.is_relative() {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    };
    Some((shown.display().to_string(), content))
}
