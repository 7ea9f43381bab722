//! Runtime configuration: defaults, then `GUARDIAN_*` environment variables,
//! then command-line flags (applied by the binary).

use std::path::PathBuf;

use crate::errors::{CoreError, CoreResult};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE: &str = "guardian.db";
pub const DEFAULT_STORAGE_ROOT: &str = "./storage";
pub const DEFAULT_DOWNLOAD_URL_TTL_SECS: i64 = 900;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database: String,
    /// `None` allows any origin.
    pub cors_origin: Option<String>,
    pub storage_root: PathBuf,
    /// Falls back to `http://localhost:{port}`.
    pub public_base_url: Option<String>,
    pub signing_secret: String,
    pub download_url_ttl_secs: i64,
    pub session_ttl_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            cors_origin: None,
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            public_base_url: None,
            signing_secret: format!(
                "{}{}",
                uuid::Uuid::new_v4().simple(),
                uuid::Uuid::new_v4().simple()
            ),
            download_url_ttl_secs: DEFAULT_DOWNLOAD_URL_TTL_SECS,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> CoreResult<T> {
    raw.trim().parse::<T>().map_err(|_| {
        CoreError::invalid_field(name, format!("{} must be a number, got '{}'", name, raw))
    })
}

fn parse_positive(name: &str, raw: &str) -> CoreResult<i64> {
    let value: i64 = parse_number(name, raw)?;
    if value <= 0 {
        return Err(CoreError::invalid_field(name, format!("{} must be positive", name)));
    }
    Ok(value)
}

impl AppConfig {
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("GUARDIAN_PORT") {
            config.port = parse_number("GUARDIAN_PORT", &raw)?;
        }
        if let Some(database) = lookup("GUARDIAN_DATABASE") {
            config.database = database;
        }
        if let Some(origin) = lookup("GUARDIAN_CORS_ORIGIN") {
            config.cors_origin = Some(origin);
        }
        if let Some(root) = lookup("GUARDIAN_STORAGE_ROOT") {
            config.storage_root = PathBuf::from(root);
        }
        if let Some(url) = lookup("GUARDIAN_PUBLIC_BASE_URL") {
            config.public_base_url = Some(url);
        }
        if let Some(secret) = lookup("GUARDIAN_SIGNING_SECRET") {
            if secret.trim().is_empty() {
                return Err(CoreError::invalid_field(
                    "GUARDIAN_SIGNING_SECRET",
                    "signing secret cannot be empty",
                ));
            }
            config.signing_secret = secret;
        }
        if let Some(raw) = lookup("GUARDIAN_DOWNLOAD_URL_TTL_SECS") {
            config.download_url_ttl_secs = parse_positive("GUARDIAN_DOWNLOAD_URL_TTL_SECS", &raw)?;
        }
        if let Some(raw) = lookup("GUARDIAN_SESSION_TTL_HOURS") {
            config.session_ttl_hours = parse_positive("GUARDIAN_SESSION_TTL_HOURS", &raw)?;
        }

        Ok(config)
    }

    pub fn public_base_url(&self) -> String {
        self.public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }

    pub fn download_url_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.download_url_ttl_secs)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::errors::CoreErrorKind;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database, "guardian.db");
        assert_eq!(config.public_base_url(), "http://localhost:3000");
        assert_eq!(config.download_url_ttl(), chrono::Duration::seconds(900));
        assert_eq!(config.session_ttl(), chrono::Duration::hours(24));
        assert!(!config.signing_secret.is_empty());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GUARDIAN_PORT", "8080"),
            ("GUARDIAN_DATABASE", ":memory:"),
            ("GUARDIAN_PUBLIC_BASE_URL", "https://portal.example.com"),
            ("GUARDIAN_DOWNLOAD_URL_TTL_SECS", "60"),
        ]))
        .expect("config");

        assert_eq!(config.port, 8080);
        assert_eq!(config.database, ":memory:");
        assert_eq!(config.public_base_url(), "https://portal.example.com");
        assert_eq!(config.download_url_ttl_secs, 60);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("GUARDIAN_PORT", "eighty")])).unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::InvalidInput);

        assert!(
            AppConfig::from_lookup(lookup(&[("GUARDIAN_SESSION_TTL_HOURS", "0")])).is_err()
        );
    }
}
