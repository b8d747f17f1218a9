// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use courierlink_config::diagnostic::ConfigError;
use courierlink_config::model::CourierlinkConfig;
use courierlink_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_str, render_toml,
};
use serial_test::serial;

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[app]
name = "courierlink-staging"
log_level = "debug"

[storage]
database_path = "/tmp/courierlink.db"
wal_mode = false

[gate]
enforce_inbound_requests = true
upgrade_url = "/fiyatlandirma"
sign_in_path = "/giris"
chat_path = "/mesajlar"

[realtime]
channel_capacity = 32
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.name, "courierlink-staging");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/courierlink.db");
    assert!(!config.storage.wal_mode);
    assert!(config.gate.enforce_inbound_requests);
    assert_eq!(config.gate.upgrade_url, "/fiyatlandirma");
    assert_eq!(config.gate.sign_in_path, "/giris");
    assert_eq!(config.gate.chat_path, "/mesajlar");
    assert_eq!(config.realtime.channel_capacity, 32);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.app.name, "courierlink");
    assert_eq!(config.app.log_level, "info");
    assert!(config.storage.database_path.ends_with("courierlink.db"));
    assert!(config.storage.wal_mode);
    assert!(!config.gate.enforce_inbound_requests);
    assert_eq!(config.gate.upgrade_url, "/pricing");
    assert_eq!(config.gate.sign_in_path, "/sign-in");
    assert_eq!(config.realtime.channel_capacity, 256);
}

#[test]
fn unknown_field_in_gate_is_rejected() {
    let toml = r#"
[gate]
enforce_inbound = true
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("enforce_inbound"),
        "error should mention the unknown key, got: {err_str}"
    );
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[billing]
stripe_key = "sk"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn dotted_override_takes_precedence() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: CourierlinkConfig = Figment::new()
        .merge(Serialized::defaults(CourierlinkConfig::default()))
        .merge(Toml::string("[gate]\nupgrade_url = \"/from-toml\"\n"))
        .merge(("gate.upgrade_url", "/from-env"))
        .extract()
        .expect("should merge override");
    assert_eq!(config.gate.upgrade_url, "/from-env");
}

#[test]
fn missing_config_files_are_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: CourierlinkConfig = Figment::new()
        .merge(Serialized::defaults(CourierlinkConfig::default()))
        .merge(Toml::file("/nonexistent/courierlink.toml"))
        .extract()
        .expect("missing file should be skipped");
    assert_eq!(config.app.name, "courierlink");
}

#[test]
fn unknown_key_diagnostic_carries_suggestion() {
    let toml = r#"
[gate]
upgrade_ulr = "/p"
"#;
    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "upgrade_ulr"
                && suggestion.as_deref() == Some("upgrade_url")
                && valid_keys.contains("sign_in_path")
        })
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[realtime]
channel_capacity = "lots"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, found, .. }
                if key.ends_with("channel_capacity") && found.contains("lots"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_runs_after_load() {
    let toml = r#"
[gate]
sign_in_path = "giris"
"#;
    let errors = load_and_validate_str(toml).expect_err("relative route should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::InvalidValue { key: "gate.sign_in_path", help: Some(help), .. }
            if help.contains("/sign-in"))
    }));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "upgrade_ulr".to_string(),
        suggestion: Some("upgrade_url".to_string()),
        valid_keys: "enforce_inbound_requests, upgrade_url".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `upgrade_url`"));

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("upgrade_ulr"));
}

#[test]
#[serial]
fn env_overrides_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "courierlink.toml",
            "[gate]\nupgrade_url = \"/from-file\"\nsign_in_path = \"/giris\"\n",
        )?;
        jail.set_env("COURIERLINK_GATE_UPGRADE_URL", "/from-env");

        let config = load_and_validate_path(std::path::Path::new("courierlink.toml"))
            .expect("config should load");
        assert_eq!(config.gate.upgrade_url, "/from-env");
        assert_eq!(config.gate.sign_in_path, "/giris");
        Ok(())
    });
}

#[test]
fn rendered_toml_loads_back() {
    let mut config = CourierlinkConfig::default();
    config.gate.enforce_inbound_requests = true;
    config.realtime.channel_capacity = 64;

    let rendered = render_toml(&config).expect("config should render");
    let loaded = load_and_validate_str(&rendered).expect("rendered config should be valid");
    assert!(loaded.gate.enforce_inbound_requests);
    assert_eq!(loaded.realtime.channel_capacity, 64);
    assert_eq!(loaded.storage.database_path, config.storage.database_path);
}

#[test]
#[serial]
fn unknown_key_in_file_is_located() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("courierlink.toml");
    std::fs::write(&path, "[app]\nlog_level = \"warn\"\n\n[gate]\nchat_pth = \"/m\"\n").unwrap();

    let errors = load_and_validate_path(&path).expect_err("typo should be rejected");
    let Some(ConfigError::UnknownKey { span, src, suggestion, .. }) = errors.first() else {
        panic!("expected UnknownKey, got: {errors:?}");
    };
    assert_eq!(suggestion.as_deref(), Some("chat_path"));
    if src.is_some() {
        let content = std::fs::read_to_string(&path).unwrap();
        let offset = span.expect("a located key has a span").offset();
        assert!(content[offset..].starts_with("chat_pth"));
    }
}
