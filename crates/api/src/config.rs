//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use banking_infra::jobs::{ExecutorError, StatementExecutorConfig};
use banking_observability::LogFormat;

pub const BIND_ADDR_VAR: &str = "BANKING_BIND_ADDR";
pub const LOG_FORMAT_VAR: &str = "BANKING_LOG_FORMAT";
pub const CORE_WORKERS_VAR: &str = "STATEMENT_CORE_WORKERS";
pub const MAX_WORKERS_VAR: &str = "STATEMENT_MAX_WORKERS";
pub const QUEUE_CAPACITY_VAR: &str = "STATEMENT_QUEUE_CAPACITY";
pub const KEEP_ALIVE_VAR: &str = "STATEMENT_WORKER_KEEP_ALIVE_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    Pool(#[from] ExecutorError),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub statements: StatementExecutorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_format: LogFormat::Json,
            statements: StatementExecutorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup; unset variables
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let pool = defaults.statements;

        let keep_alive_secs = parse_var(&lookup, KEEP_ALIVE_VAR, pool.keep_alive.as_secs())?;
        let statements = StatementExecutorConfig::default()
            .with_workers(
                parse_var(&lookup, CORE_WORKERS_VAR, pool.core_workers)?,
                parse_var(&lookup, MAX_WORKERS_VAR, pool.max_workers)?,
            )
            .with_queue_capacity(parse_var(&lookup, QUEUE_CAPACITY_VAR, pool.queue_capacity)?)
            .with_keep_alive(Duration::from_secs(keep_alive_secs));
        statements.validate()?;

        Ok(Self {
            bind_addr: parse_var(&lookup, BIND_ADDR_VAR, defaults.bind_addr)?,
            log_format: parse_var(&lookup, LOG_FORMAT_VAR, defaults.log_format)?,
            statements,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.statements.core_workers, 2);
        assert_eq!(config.statements.max_workers, 5);
        assert_eq!(config.statements.queue_capacity, 100);
        assert_eq!(config.statements.keep_alive, Duration::from_secs(60));
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (LOG_FORMAT_VAR, "pretty"),
            (CORE_WORKERS_VAR, "4"),
            (MAX_WORKERS_VAR, "8"),
            (QUEUE_CAPACITY_VAR, "10"),
            (KEEP_ALIVE_VAR, "5"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.statements.core_workers, 4);
        assert_eq!(config.statements.max_workers, 8);
        assert_eq!(config.statements.queue_capacity, 10);
        assert_eq!(config.statements.keep_alive, Duration::from_secs(5));
    }

    #[test]
    fn rejects_unparsable_values() {
        let err = AppConfig::from_lookup(lookup(&[(CORE_WORKERS_VAR, "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { var: CORE_WORKERS_VAR, .. }));
    }

    #[test]
    fn rejects_inconsistent_pool_sizes() {
        let err = AppConfig::from_lookup(lookup(&[(CORE_WORKERS_VAR, "6"), (MAX_WORKERS_VAR, "3")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Pool(ExecutorError::InvalidConfig(_))));

        let err = AppConfig::from_lookup(lookup(&[(CORE_WORKERS_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Pool(ExecutorError::InvalidConfig(_))));
    }
}
