//! Process-wide database configuration.
//!
//! # Responsibility
//! - Load database endpoint and credentials from the environment.
//! - Validate them once at startup and keep them immutable afterwards.
//!
//! # Invariants
//! - `url` and `user` are never blank.
//! - `password` is always present; an empty string is a valid password.
//! - The global configuration is set at most once per process.

use log::info;
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ENV_DB_URL: &str = "CLINICAL_DB_URL";
pub const ENV_DB_USER: &str = "CLINICAL_DB_USER";
pub const ENV_DB_PASSWORD: &str = "CLINICAL_DB_PASSWORD";

pub const DEFAULT_DB_URL: &str = "clinical.sqlite3";
pub const DEFAULT_DB_USER: &str = "root";

static DB_CONFIG: OnceCell<DbConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingUrl,
    MissingUser,
    MissingPassword,
    AlreadyInitialized,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUrl => write!(f, "database url is not configured"),
            Self::MissingUser => write!(f, "database user is not configured"),
            Self::MissingPassword => write!(f, "database password is not configured"),
            Self::AlreadyInitialized => {
                write!(f, "database configuration already initialized")
            }
        }
    }
}

impl Error for ConfigError {}

/// Database endpoint and credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub user: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl DbConfig {
    /// Reads `CLINICAL_DB_URL`, `CLINICAL_DB_USER` and `CLINICAL_DB_PASSWORD`,
    /// falling back to `clinical.sqlite3`, `root` and an empty password.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            url: lookup(ENV_DB_URL).unwrap_or_else(|| DEFAULT_DB_URL.to_string()),
            user: lookup(ENV_DB_USER).unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
            password: Some(lookup(ENV_DB_PASSWORD).unwrap_or_default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::MissingUser);
        }
        if self.password.is_none() {
            return Err(ConfigError::MissingPassword);
        }
        Ok(())
    }

    /// Filesystem path named by `url`, without any `sqlite:` scheme prefix.
    pub fn database_path(&self) -> &str {
        let url = self.url.trim();
        url.strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
    }
}

/// Validates `config` and installs it as the process-wide configuration.
///
/// # Errors
/// - Any [`DbConfig::validate`] failure.
/// - [`ConfigError::AlreadyInitialized`] when a different config was installed.
///   Re-installing an identical config is a no-op.
pub fn init_config(config: DbConfig) -> Result<&'static DbConfig, ConfigError> {
    config.validate()?;

    if let Some(active) = DB_CONFIG.get() {
        if *active == config {
            return Ok(active);
        }
        return Err(ConfigError::AlreadyInitialized);
    }

    let candidate = config.clone();
    let installed = DB_CONFIG.get_or_init(|| config);
    if *installed != candidate {
        return Err(ConfigError::AlreadyInitialized);
    }
    info!(
        "event=config_init module=config status=ok url={} user={}",
        installed.url, installed.user
    );
    Ok(installed)
}

/// Returns the installed configuration, if any.
pub fn db_config() -> Option<&'static DbConfig> {
    DB_CONFIG.get()
}
