// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::CourierlinkConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn invalid(key: &'static str, message: impl Into<String>, help: Option<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        message: message.into(),
        help,
    }
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &CourierlinkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(invalid(
            "app.log_level",
            format!("unknown level `{}`", config.app.log_level),
            Some(format!("use one of: {}", LOG_LEVELS.join(", "))),
        ));
    }

    if config.app.name.trim().is_empty() {
        errors.push(invalid("app.name", "must not be empty", None));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(invalid(
            "storage.database_path",
            "must not be empty",
            Some("point it at a writable SQLite file".into()),
        ));
    }

    if config.gate.upgrade_url.trim().is_empty() {
        errors.push(invalid(
            "gate.upgrade_url",
            "must not be empty",
            Some("blocked businesses are sent here to pick a plan".into()),
        ));
    }

    for (key, path, example) in [
        ("gate.sign_in_path", &config.gate.sign_in_path, "/sign-in"),
        ("gate.chat_path", &config.gate.chat_path, "/messages"),
    ] {
        if !path.starts_with('/') {
            errors.push(invalid(
                key,
                format!("`{path}` is not an absolute route"),
                Some(format!("start it with `/`, for example `{example}`")),
            ));
        }
    }

    if config.realtime.channel_capacity == 0 {
        errors.push(invalid(
            "realtime.channel_capacity",
            "must be at least 1",
            None,
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
