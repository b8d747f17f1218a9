// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for courierlink.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CourierlinkConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Conversation gate policy and user-facing routes.
    #[serde(default)]
    pub gate: GateConfig,

    /// Realtime change feed settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name used in logs and CLI output.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "courierlink".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("courierlink").join("courierlink.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "courierlink.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Conversation gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Refuse courier-initiated contact with businesses whose plan cannot
    /// receive requests. When false the flag is display-only.
    #[serde(default)]
    pub enforce_inbound_requests: bool,

    /// Target of the upgrade call-to-action.
    #[serde(default = "default_upgrade_url")]
    pub upgrade_url: String,

    /// Where unauthenticated users are sent.
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,

    /// Prefix of the chat view route; the conversation id is appended.
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enforce_inbound_requests: false,
            upgrade_url: default_upgrade_url(),
            sign_in_path: default_sign_in_path(),
            chat_path: default_chat_path(),
        }
    }
}

fn default_upgrade_url() -> String {
    "/pricing".to_string()
}

fn default_sign_in_path() -> String {
    "/sign-in".to_string()
}

fn default_chat_path() -> String {
    "/messages".to_string()
}

/// Realtime change feed configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Events buffered per subscriber before the slowest one starts skipping.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}
