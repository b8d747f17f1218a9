// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./courierlink.toml` > `~/.config/courierlink/courierlink.toml`
//! > `/etc/courierlink/courierlink.toml`, with `COURIERLINK_` environment
//! overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CourierlinkConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/courierlink/courierlink.toml`
/// 3. `~/.config/courierlink/courierlink.toml`
/// 4. `./courierlink.toml`
/// 5. `COURIERLINK_*` environment variables
pub fn load_config() -> Result<CourierlinkConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over compiled defaults.
pub fn load_config_from_str(toml_content: &str) -> Result<CourierlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierlinkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CourierlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CourierlinkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files searched by [`load_config`], lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/courierlink/courierlink.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("courierlink/courierlink.toml"));
    }
    paths.push(PathBuf::from("courierlink.toml"));
    paths
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(CourierlinkConfig::default()));
    for path in search_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Environment provider mapping the first underscore to a section dot.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that
/// `COURIERLINK_GATE_UPGRADE_URL` maps to `gate.upgrade_url`, not
/// `gate.upgrade.url`.
fn env_provider() -> Env {
    Env::prefixed("COURIERLINK_").map(|key| {
        let key_str = key.as_str();
        for section in SECTIONS {
            if let Some(field) = key_str
                .strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
            {
                return format!("{section}.{field}").into();
            }
        }
        key_str.to_string().into()
    })
}

const SECTIONS: [&str; 4] = ["app", "storage", "gate", "realtime"];
