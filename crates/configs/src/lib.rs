//! lostfound/crates/configs/src/lib.rs
//!
//! Layered settings: built-in defaults, then `config/default.toml`, then
//! `config/local.toml`, then `LOSTFOUND__SECTION__KEY` environment variables.
//! A `.env` file is loaded into the environment first.

use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "LOSTFOUND";
/// Upper bound for `verification.window_hours` (one year).
pub const MAX_WINDOW_HOURS: i64 = 24 * 365;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub scheduler: SchedulerSettings,
    pub verification: VerificationSettings,
    pub notifier: NotifierSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub enabled: bool,
    pub interval_minutes: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VerificationSettings {
    pub window_hours: i64,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self { window_hours: 24 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotifierSettings {
    pub from_name: String,
    pub from_email: String,
    pub portal_url: String,
    pub verification_desk: String,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            from_name: "Lost and Found".to_string(),
            from_email: "lostfound@localhost".to_string(),
            portal_url: "http://localhost:5173/lost-items".to_string(),
            verification_desk: "Security Counter, A1 Building".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    #[serde(deserialize_with = "optional_secret")]
    pub database_url: Option<SecretString>,
    pub max_connections: u32,
}

fn optional_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|url| !url.is_empty())
        .map(SecretString::from))
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads `.env`, then the layered sources under `./config`.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::load_from(Path::new("config"), None)
    }

    /// Loads from `dir/default.*` and `dir/local.*` (both optional) plus the
    /// environment. Pass `env` to replace the process environment.
    pub fn load_from(dir: &Path, env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(env);

        let settings: Settings = Config::builder()
            .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
            .add_source(File::with_name(&dir.join("local").to_string_lossy()).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.scheduler.interval_minutes < 1 {
            return Err(ConfigError::Invalid(
                "scheduler.interval_minutes must be at least 1".into(),
            ));
        }
        if !(1..=MAX_WINDOW_HOURS).contains(&self.verification.window_hours) {
            return Err(ConfigError::Invalid(format!(
                "verification.window_hours must be between 1 and {MAX_WINDOW_HOURS}"
            )));
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return Err(ConfigError::Invalid(
                "storage.database_url is required for the postgres backend".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn no_files() -> &'static Path {
        Path::new("does-not-exist")
    }

    #[test]
    fn defaults_apply_without_sources() {
        let settings = Settings::load_from(no_files(), env(&[])).unwrap();
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:8080");
        assert!(settings.scheduler.enabled);
        assert_eq!(settings.scheduler.interval_minutes, 30);
        assert_eq!(settings.verification.window_hours, 24);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn environment_overrides_nested_keys() {
        let settings = Settings::load_from(
            no_files(),
            env(&[
                ("LOSTFOUND__SERVER__PORT", "9090"),
                ("LOSTFOUND__SCHEDULER__INTERVAL_MINUTES", "5"),
                ("LOSTFOUND__SCHEDULER__ENABLED", "false"),
                ("LOSTFOUND__LOGGING__FORMAT", "json"),
                ("LOSTFOUND__STORAGE__BACKEND", "postgres"),
                ("LOSTFOUND__STORAGE__DATABASE_URL", "postgres://lf:pw@db/lostfound"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.scheduler.interval_minutes, 5);
        assert!(!settings.scheduler.enabled);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(
            settings.storage.database_url.as_ref().unwrap().expose_secret(),
            "postgres://lf:pw@db/lostfound"
        );
    }

    #[test]
    fn database_url_is_redacted_in_debug_output() {
        let settings = Settings::load_from(
            no_files(),
            env(&[("LOSTFOUND__STORAGE__DATABASE_URL", "postgres://lf:hunter2@db/lf")]),
        )
        .unwrap();
        assert!(!format!("{settings:?}").contains("hunter2"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Settings::load_from(
            no_files(),
            env(&[("LOSTFOUND__SCHEDULER__INTERVAL_MINUTES", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("interval_minutes")));
    }

    #[test]
    fn window_hours_are_bounded() {
        for hours in ["0", "8761", "9223372036854775807"] {
            let err = Settings::load_from(
                no_files(),
                env(&[("LOSTFOUND__VERIFICATION__WINDOW_HOURS", hours)]),
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("window_hours")));
        }
        let settings = Settings::load_from(
            no_files(),
            env(&[("LOSTFOUND__VERIFICATION__WINDOW_HOURS", "8760")]),
        )
        .unwrap();
        assert_eq!(settings.verification.window_hours, MAX_WINDOW_HOURS);
    }

    #[test]
    fn postgres_without_url_is_rejected() {
        let err = Settings::load_from(
            no_files(),
            env(&[("LOSTFOUND__STORAGE__BACKEND", "postgres")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
