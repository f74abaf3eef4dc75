use std::time::Duration;

use roomly_core::config::{ConfigError, ConfigValue, DefaultSecretResolver, RoomlyConfig};
use roomly_core::{ClientConfig, LogFormat};
use serial_test::serial;

#[test]
fn test_empty_config() {
    let config = RoomlyConfig::empty();
    assert!(matches!(
        config.get::<String>("roomly.api.url"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_set_and_get() {
    let mut config = RoomlyConfig::empty();
    config.set("roomly.api.url", ConfigValue::String("http://localhost:3000".into()));
    assert_eq!(
        config.get::<String>("roomly.api.url").unwrap(),
        "http://localhost:3000"
    );
}

#[test]
fn test_get_or_default_and_malformed() {
    let mut config = RoomlyConfig::empty();
    assert_eq!(config.get_or("roomly.page.limit", 20u32).unwrap(), 20);

    config.set("roomly.page.limit", ConfigValue::String("many".into()));
    assert!(config.get_or("roomly.page.limit", 20u32).is_err());
}

#[test]
fn test_flatten_yaml() {
    let yaml = r#"
roomly:
  api:
    url: "https://api.roomly.test"
    timeout: 2500
  storage:
    namespace: "tenant-app"
"#;
    let config = RoomlyConfig::from_yaml_str(yaml, "test").unwrap();
    assert_eq!(
        config.get::<String>("roomly.api.url").unwrap(),
        "https://api.roomly.test"
    );
    assert_eq!(config.get::<u64>("roomly.api.timeout").unwrap(), 2500);
    assert_eq!(
        config.get::<String>("roomly.storage.namespace").unwrap(),
        "tenant-app"
    );
}

#[test]
fn test_typed_client_config_defaults() {
    let yaml = r#"
roomly:
  api:
    url: "https://api.roomly.test/v1/"
"#;
    let config = RoomlyConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .with_typed::<ClientConfig>()
        .unwrap();

    assert_eq!(config.api_url, "https://api.roomly.test/v1");
    assert_eq!(config.timeout, Duration::from_millis(15_000));
    assert_eq!(config.storage_namespace, "roomly");
    assert_eq!(config.page_limit, 20);
    assert_eq!(config.log_format, LogFormat::Pretty);
    assert!(config.api_token.is_none());
    assert!(config.storage_dir.is_none());
    assert_eq!(config.profile(), "test");
}

#[test]
fn test_typed_client_config_validation() {
    let yaml = r#"
roomly:
  api:
    url: "ftp://nope"
    timeout: 0
  log:
    format: "xml"
"#;
    let err = RoomlyConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .with_typed::<ClientConfig>()
        .unwrap_err();

    match err {
        ConfigError::Validation(details) => {
            let keys: Vec<&str> = details.iter().map(|d| d.key.as_str()).collect();
            assert_eq!(
                keys,
                vec!["roomly.api.url", "roomly.api.timeout", "roomly.log.format"]
            );
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn test_missing_url_is_not_found() {
    let err = RoomlyConfig::from_yaml_str("roomly: {}", "test")
        .unwrap()
        .with_typed::<ClientConfig>()
        .unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(key) if key == "roomly.api.url"));
}

#[test]
#[serial]
fn test_files_profile_and_env_overlay() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("roomly.yaml"),
        "roomly:\n  api:\n    url: \"https://base.test\"\n    timeout: 1000\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("roomly-staging.yaml"),
        "roomly:\n  api:\n    timeout: 3000\n  storage:\n    dir: \"/tmp/roomly\"\n",
    )
    .unwrap();
    std::env::set_var("ROOMLY_API_URL", "https://override.test");

    let config =
        RoomlyConfig::load_from_dir(dir.path(), "staging", &DefaultSecretResolver).unwrap();
    std::env::remove_var("ROOMLY_API_URL");

    assert_eq!(config.profile(), "staging");
    assert_eq!(
        config.get::<String>("roomly.api.url").unwrap(),
        "https://override.test"
    );
    assert_eq!(config.get::<u64>("roomly.api.timeout").unwrap(), 3000);
    assert_eq!(
        config.get::<String>("roomly.storage.dir").unwrap(),
        "/tmp/roomly"
    );
}

#[test]
#[serial]
fn test_token_placeholder_resolved_from_env() {
    std::env::set_var("ROOMLY_TEST_SESSION_TOKEN", "tok-123");
    let yaml = r#"
roomly:
  api:
    url: "https://api.roomly.test"
    token: "${env:ROOMLY_TEST_SESSION_TOKEN}"
"#;
    let config = RoomlyConfig::from_yaml_str(yaml, "test")
        .unwrap()
        .with_typed::<ClientConfig>()
        .unwrap();
    std::env::remove_var("ROOMLY_TEST_SESSION_TOKEN");

    assert_eq!(config.api_token.as_deref(), Some("tok-123"));
}
