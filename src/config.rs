//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{AppError, Result};

/// Keychain service name used for the `CouchDB` password.
pub const KEYRING_SERVICE: &str = "idea-capture";

/// Environment variable overriding [`StoreConfig::url`].
pub const ENV_URL: &str = "COUCHDB_URL";
/// Environment variable overriding [`StoreConfig::username`].
pub const ENV_USERNAME: &str = "COUCHDB_USERNAME";
/// Environment variable supplying the password when the keychain has none.
pub const ENV_PASSWORD: &str = "COUCHDB_PASSWORD";
/// Environment variable overriding [`StoreConfig::database`].
pub const ENV_DATABASE: &str = "COUCHDB_DATABASE";

/// Connection settings for the `CouchDB` document store.
///
/// The password is never read from the TOML file; it is loaded at runtime
/// from the OS keychain or the `COUCHDB_PASSWORD` environment variable.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StoreConfig {
    /// Base server URL, e.g. `http://localhost:5984`.
    #[serde(default = "default_url")]
    pub url: String,
    /// Database holding idea documents.
    #[serde(default = "default_database")]
    pub database: String,
    /// User name for HTTP basic authentication.
    #[serde(default)]
    pub username: Option<String>,
    /// Password for HTTP basic authentication (populated at runtime).
    #[serde(skip)]
    pub password: Option<String>,
    /// Per-request timeout in seconds; 0 keeps the transport default.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            database: default_database(),
            username: None,
            password: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl StoreConfig {
    /// Username/password pair for basic auth when both are present.
    #[must_use]
    pub fn auth(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// Full database URL (`{url}/{database}`).
    #[must_use]
    pub fn db_url(&self) -> String {
        format!("{}/{}", self.url, self.database)
    }

    /// Require both credentials to be configured.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the username or password is missing.
    pub fn ensure_credentials(&self) -> Result<()> {
        if self.auth().is_none() {
            return Err(AppError::Config(format!(
                "CouchDB credentials not configured; set {ENV_USERNAME} and {ENV_PASSWORD} \
                 (or store the password in the '{KEYRING_SERVICE}' keychain entry)"
            )));
        }
        Ok(())
    }
}

/// HTTP server settings for the REST API and MCP streamable transport.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct HttpConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind; 0 lets the OS choose.
    #[serde(default = "default_http_port")]
    pub port: u16,
    /// Path prefix the REST router is nested under.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
            api_prefix: default_api_prefix(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:5984".into()
}

fn default_database() -> String {
    "ideas".into()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_http_port() -> u16 {
    8000
}

fn default_api_prefix() -> String {
    "/api/ideas".into()
}

fn default_next_limit() -> usize {
    5
}

fn default_list_limit() -> usize {
    20
}

/// Global configuration parsed from `idea-capture.toml`.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Document store connection settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// REST / MCP HTTP server settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Default count for next-actions when the caller gives none.
    #[serde(default = "default_next_limit")]
    pub next_limit: usize,
    /// Default page size for MCP `idea_list` calls.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            http: HttpConfig::default(),
            next_limit: default_next_limit(),
            list_limit: default_list_limit(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and normalize it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration for a binary: optional file, then `.env`-style
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` on unreadable files or invalid values.
    pub fn resolve(path: Option<&PathBuf>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `COUCHDB_URL`, `COUCHDB_USERNAME` and `COUCHDB_DATABASE`
    /// overrides from the process environment and re-validate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if an overridden value is invalid.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(url) = non_empty_env(ENV_URL) {
            self.store.url = url;
        }
        if let Some(username) = non_empty_env(ENV_USERNAME) {
            self.store.username = Some(username);
        }
        if let Some(database) = non_empty_env(ENV_DATABASE) {
            self.store.database = database;
        }
        self.validate()
    }

    /// Load the `CouchDB` password from the OS keychain with env-var fallback.
    ///
    /// A missing password is not an error here; commands that talk to the
    /// store call [`StoreConfig::ensure_credentials`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the keychain task panics.
    pub async fn load_credentials(&mut self) -> Result<()> {
        let Some(username) = self.store.username.clone() else {
            self.store.password = non_empty_env(ENV_PASSWORD);
            return Ok(());
        };
        self.store.password = load_credential(&username, ENV_PASSWORD).await?;
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        let url = self.store.url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "store.url must be an http(s) URL, got '{}'",
                self.store.url
            )));
        }
        self.store.url = url.to_owned();

        validate_database_name(&self.store.database)?;

        let prefix = self.http.api_prefix.trim().trim_end_matches('/');
        if !prefix.starts_with('/') {
            return Err(AppError::Config("http.api_prefix must start with '/'".into()));
        }
        self.http.api_prefix = prefix.to_owned();

        if self.next_limit == 0 || self.list_limit == 0 {
            return Err(AppError::Config(
                "next_limit and list_limit must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// `CouchDB` database names: lowercase letter first, then `[a-z0-9_$()+/-]`.
fn validate_database_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_first = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    if valid_first && chars.all(is_database_name_char) {
        Ok(())
    } else {
        Err(AppError::Config(format!("invalid database name '{name}'")))
    }
}

fn is_database_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || "_$()+-/".contains(c)
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_user: &str, env_key: &str) -> Result<Option<String>> {
    let user = keyring_user.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &user).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(Some(value)),
        Ok(_) => {
            warn!(
                user = keyring_user,
                "keychain entry is empty, trying env var"
            );
        }
        Err(err) => {
            debug!(user = keyring_user, %err, "keychain lookup failed, trying env var");
        }
    }

    Ok(non_empty_env(env_key))
}
