use idea_capture::config::{GlobalConfig, ENV_DATABASE, ENV_URL, ENV_USERNAME};
use idea_capture::AppError;
use serial_test::serial;

fn sample_toml() -> &'static str {
    r#"
next_limit = 10
list_limit = 50

[store]
url = "https://couch.example.com:6984/"
database = "journal"
username = "admin"
request_timeout_seconds = 5

[http]
host = "0.0.0.0"
port = 9000
api_prefix = "/v1/ideas/"
"#
}

fn clear_env() {
    std::env::remove_var(ENV_URL);
    std::env::remove_var(ENV_USERNAME);
    std::env::remove_var(ENV_DATABASE);
}

#[test]
fn parses_full_config() {
    let config = GlobalConfig::from_toml_str(sample_toml()).expect("valid config");
    assert_eq!(config.store.url, "https://couch.example.com:6984");
    assert_eq!(config.store.database, "journal");
    assert_eq!(config.store.username.as_deref(), Some("admin"));
    assert_eq!(config.store.request_timeout_seconds, 5);
    assert_eq!(config.http.host, "0.0.0.0");
    assert_eq!(config.http.port, 9000);
    assert_eq!(config.http.api_prefix, "/v1/ideas");
    assert_eq!(config.next_limit, 10);
    assert_eq!(config.list_limit, 50);
}

#[test]
fn empty_config_uses_defaults() {
    let config = GlobalConfig::from_toml_str("").expect("empty config is valid");
    assert_eq!(config, GlobalConfig::default());
    assert_eq!(config.store.url, "http://localhost:5984");
    assert_eq!(config.store.database, "ideas");
    assert_eq!(config.http.port, 8000);
    assert_eq!(config.http.api_prefix, "/api/ideas");
    assert_eq!(config.next_limit, 5);
}

#[test]
fn password_is_never_read_from_file() {
    let config = GlobalConfig::from_toml_str(
        r#"
[store]
username = "admin"
password = "hunter2"
"#,
    )
    .expect("unknown password key is ignored");
    assert!(config.store.password.is_none());
    assert!(config.store.auth().is_none());
}

#[test]
fn rejects_non_http_url() {
    let err = GlobalConfig::from_toml_str("[store]\nurl = \"ftp://example.com\"\n").unwrap_err();
    assert!(matches!(err, AppError::Config(_)), "got {err:?}");
}

#[test]
fn rejects_invalid_database_name() {
    for name in ["Ideas", "1ideas", "", "my ideas"] {
        let raw = format!("[store]\ndatabase = \"{name}\"\n");
        let err = GlobalConfig::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "{name}: got {err:?}");
    }
}

#[test]
fn rejects_root_api_prefix() {
    let err = GlobalConfig::from_toml_str("[http]\napi_prefix = \"/\"\n").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn rejects_zero_limits() {
    let err = GlobalConfig::from_toml_str("next_limit = 0\n").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn rejects_malformed_toml() {
    let err = GlobalConfig::from_toml_str("[store\nurl = 1").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("idea-capture.toml");
    std::fs::write(&path, sample_toml()).expect("write config");
    let config = GlobalConfig::load_from_path(&path).expect("load");
    assert_eq!(config.store.database, "journal");
}

#[test]
fn missing_file_is_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = GlobalConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    std::env::set_var(ENV_URL, "http://db.internal:5984/");
    std::env::set_var(ENV_USERNAME, "robot");
    std::env::set_var(ENV_DATABASE, "scratch");

    let mut config = GlobalConfig::from_toml_str(sample_toml()).expect("valid config");
    config.apply_env_overrides().expect("valid overrides");
    clear_env();

    assert_eq!(config.store.url, "http://db.internal:5984");
    assert_eq!(config.store.username.as_deref(), Some("robot"));
    assert_eq!(config.store.database, "scratch");
}

#[test]
#[serial]
fn blank_env_values_are_ignored() {
    clear_env();
    std::env::set_var(ENV_DATABASE, "   ");

    let mut config = GlobalConfig::from_toml_str(sample_toml()).expect("valid config");
    config.apply_env_overrides().expect("blank value ignored");
    clear_env();

    assert_eq!(config.store.database, "journal");
}

#[test]
#[serial]
fn invalid_env_override_is_rejected() {
    clear_env();
    std::env::set_var(ENV_DATABASE, "Bad Name");

    let result = GlobalConfig::resolve(None);
    clear_env();

    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn ensure_credentials_requires_both_parts() {
    let mut config = GlobalConfig::default();
    assert!(config.store.ensure_credentials().is_err());

    config.store.username = Some("admin".into());
    assert!(config.store.ensure_credentials().is_err());

    config.store.password = Some("secret".into());
    config.store.ensure_credentials().expect("credentials");
    assert_eq!(config.store.auth(), Some(("admin", "secret")));
}

#[test]
fn db_url_joins_url_and_database() {
    let config = GlobalConfig::from_toml_str(sample_toml()).expect("valid config");
    assert_eq!(
        config.store.db_url(),
        "https://couch.example.com:6984/journal"
    );
}
