//! Application configuration loaded from the environment.

use chrono::{DateTime, Utc};
use db::DbConfig;
use thiserror::Error;

use crate::auth::JwtConfig;

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 120;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Everything needed to start a task manager.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db: DbConfig,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn new(db: DbConfig, jwt: JwtConfig) -> Self {
        Self { db, jwt }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default       |
    /// |----------------------------|----------|---------------|
    /// | `TASKMANAGER_DB_ENDPOINT`  | no       | `mem://`      |
    /// | `TASKMANAGER_DB_NAMESPACE` | no       | `taskmanager` |
    /// | `TASKMANAGER_DB_DATABASE`  | no       | `main`        |
    /// | `JWT_SECRET`               | **yes**  | --            |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `120`         |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = DbConfig::default();
        let db = DbConfig::default()
            .with_endpoint(lookup("TASKMANAGER_DB_ENDPOINT").unwrap_or(defaults.endpoint))
            .with_namespace(lookup("TASKMANAGER_DB_NAMESPACE").unwrap_or(defaults.namespace))
            .with_database(lookup("TASKMANAGER_DB_DATABASE").unwrap_or(defaults.database));

        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let jwt = JwtConfig::new(secret)
            .with_access_expiry_mins(lifetime(
                &lookup,
                "JWT_ACCESS_EXPIRY_MINS",
                DEFAULT_ACCESS_EXPIRY_MINS,
                |mins| JwtConfig::new("").with_access_expiry_mins(mins).access_expires_at(Utc::now()),
            )?)
            .with_refresh_expiry_days(lifetime(
                &lookup,
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
                |days| JwtConfig::new("").with_refresh_expiry_days(days).refresh_expires_at(Utc::now()),
            )?);

        Ok(Self { db, jwt })
    }
}

/// A positive token lifetime whose expiry, counted from now, is still a
/// representable timestamp.
fn lifetime(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: i64,
    expires_at: impl Fn(i64) -> Option<DateTime<Utc>>,
) -> Result<i64, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(default);
    };
    match value.trim().parse::<i64>() {
        Ok(n) if n > 0 && expires_at(n).is_some() => Ok(n),
        _ => Err(ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() -> Result<(), ConfigError> {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")]))?;
        assert_eq!(config.db.endpoint, "mem://");
        assert_eq!(config.db.namespace, "taskmanager");
        assert_eq!(config.db.database, "main");
        assert_eq!(config.jwt.access_token_expiry_mins, 120);
        assert_eq!(config.jwt.refresh_token_expiry_days, 7);
        Ok(())
    }

    #[test]
    fn overrides_are_read() -> Result<(), ConfigError> {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("TASKMANAGER_DB_ENDPOINT", "rocksdb://./data"),
            ("TASKMANAGER_DB_DATABASE", "staging"),
            ("JWT_ACCESS_EXPIRY_MINS", "15"),
        ]))?;
        assert_eq!(config.db.endpoint, "rocksdb://./data");
        assert_eq!(config.db.database, "staging");
        assert_eq!(config.jwt.access_token_expiry_mins, 15);
        Ok(())
    }

    #[test]
    fn secret_is_required() {
        let missing = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(missing.err(), Some(ConfigError::Missing("JWT_SECRET")));

        let empty = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "")]));
        assert_eq!(empty.err(), Some(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn bad_expiry_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_REFRESH_EXPIRY_DAYS", "soon"),
        ]));
        assert_eq!(
            result.err(),
            Some(ConfigError::Invalid {
                var: "JWT_REFRESH_EXPIRY_DAYS",
                value: "soon".to_string()
            })
        );
    }

    #[test]
    fn overflowing_expiry_is_rejected() {
        let huge = i64::MAX.to_string();
        for var in ["JWT_ACCESS_EXPIRY_MINS", "JWT_REFRESH_EXPIRY_DAYS"] {
            let result = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret"), (var, huge.as_str())]));
            assert_eq!(
                result.err(),
                Some(ConfigError::Invalid {
                    var,
                    value: huge.clone()
                })
            );
        }

        // Large but representable lifetimes are still accepted.
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_REFRESH_EXPIRY_DAYS", "36500"),
        ]));
        assert_eq!(config.map(|c| c.jwt.refresh_token_expiry_days), Ok(36500));
    }
}
