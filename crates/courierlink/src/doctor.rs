// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courierlink doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, the database, and the
//! plan catalog.

use std::time::{Duration, Instant};

use courierlink_config::model::CourierlinkConfig;
use courierlink_core::{HealthStatus, MatchStore, PlanTier};
use courierlink_plans::{catalog, is_unlimited};
use courierlink_storage::SqliteStorage;

use crate::Outcome;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `courierlink doctor` command.
pub async fn run_doctor(config: &CourierlinkConfig, use_color: bool) -> Outcome {
    let results = vec![
        check_gate(config),
        check_database(config).await,
        check_catalog(),
    ];

    println!();
    println!("  {}", header(config));
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        let duration_ms = result.duration.as_millis();
        let (tag, symbol) = match result.status {
            CheckStatus::Pass => ("[OK]  ", "✓"),
            CheckStatus::Warn => {
                warn_count += 1;
                ("[WARN]", "!")
            }
            CheckStatus::Fail => {
                fail_count += 1;
                ("[FAIL]", "✗")
            }
        };
        let line = if use_color {
            use colored::Colorize;
            let (symbol, message) = match result.status {
                CheckStatus::Pass => (symbol.green(), result.message.normal()),
                CheckStatus::Warn => (symbol.yellow(), result.message.yellow()),
                CheckStatus::Fail => (symbol.red(), result.message.red()),
            };
            format!("    {symbol} {:<16} {message} ({duration_ms}ms)", result.name)
        } else {
            format!(
                "    {tag} {:<16} {} ({duration_ms}ms)",
                result.name, result.message
            )
        };
        println!("{line}");
    }

    println!();
    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    if fail_count > 0 {
        Outcome::Refused
    } else {
        Outcome::Done
    }
}

fn header(config: &CourierlinkConfig) -> String {
    format!("{} doctor", config.app.name)
}

/// Report the contact policy in effect.
fn check_gate(config: &CourierlinkConfig) -> CheckResult {
    let start = Instant::now();
    if config.gate.enforce_inbound_requests {
        CheckResult::new(
            "Contact policy",
            CheckStatus::Pass,
            "inbound requests enforced by plan",
            start,
        )
    } else {
        CheckResult::new(
            "Contact policy",
            CheckStatus::Warn,
            "inbound request flag is display-only",
            start,
        )
    }
}

/// Check the database opens, migrates, and answers queries.
async fn check_database(config: &CourierlinkConfig) -> CheckResult {
    let start = Instant::now();
    let path = &config.storage.database_path;
    let existed = std::path::Path::new(path).exists();

    let storage = SqliteStorage::new(config.storage.clone());
    if let Err(e) = storage.initialize().await {
        return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
    }
    match storage.health_check().await {
        Ok(HealthStatus::Healthy) if existed => {
            CheckResult::new("Database", CheckStatus::Pass, "connected", start)
        }
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("created empty database at {path}"),
            start,
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Database", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start),
    }
}

/// Check catalog limits never decrease with the tier.
fn check_catalog() -> CheckResult {
    let start = Instant::now();
    let plans = catalog();
    if plans.len() != PlanTier::ALL.len() {
        return CheckResult::new(
            "Plan catalog",
            CheckStatus::Fail,
            format!("{} records for {} tiers", plans.len(), PlanTier::ALL.len()),
            start,
        );
    }
    let ordered = plans.windows(2).all(|pair| {
        pair[0].daily_message_limit <= pair[1].daily_message_limit
            && pair[0].daily_approval_limit <= pair[1].daily_approval_limit
            && pair[0].price <= pair[1].price
    });
    if !ordered {
        return CheckResult::new(
            "Plan catalog",
            CheckStatus::Fail,
            "limits decrease between tiers",
            start,
        );
    }
    let unlimited = plans
        .iter()
        .filter(|p| is_unlimited(p.daily_message_limit))
        .count();
    CheckResult::new(
        "Plan catalog",
        CheckStatus::Pass,
        format!("{} tiers, {unlimited} unlimited", plans.len()),
        start,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use courierlink_config::model::StorageConfig;

    fn config_at(path: &std::path::Path) -> CourierlinkConfig {
        CourierlinkConfig {
            storage: StorageConfig {
                database_path: path.display().to_string(),
                wal_mode: true,
            },
            ..Default::default()
        }
    }

    #[test]
    fn shipped_catalog_passes() {
        let result = check_catalog();
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.message, "3 tiers, 1 unlimited");
    }

    #[tokio::test]
    async fn new_database_is_a_warning_then_passes() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(&dir.path().join("doctor.db"));

        assert_eq!(check_database(&config).await.status, CheckStatus::Warn);
        assert_eq!(check_database(&config).await.status, CheckStatus::Pass);
    }

    #[test]
    fn header_uses_the_configured_app_name() {
        let mut config = CourierlinkConfig::default();
        assert_eq!(header(&config), "courierlink doctor");
        config.app.name = "kurye-eslestirme".to_string();
        assert_eq!(header(&config), "kurye-eslestirme doctor");
    }

    #[test]
    fn display_only_policy_warns() {
        let mut config = CourierlinkConfig::default();
        assert_eq!(check_gate(&config).status, CheckStatus::Warn);
        config.gate.enforce_inbound_requests = true;
        assert_eq!(check_gate(&config).status, CheckStatus::Pass);
    }
}
