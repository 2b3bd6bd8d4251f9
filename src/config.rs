//! Operator configuration loaded from the environment

use std::env;
use std::time::Duration;

use crate::{Error, Result};

/// Default metrics port
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default delay before the follow-up pass after a ConfigMap is created
pub const DEFAULT_CREATE_REQUEUE_SECS: u64 = 5;

/// Default delay before retrying a failed reconciliation
pub const DEFAULT_ERROR_REQUEUE_SECS: u64 = 30;

/// Runtime settings for the operator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Namespace to watch; `None` watches all namespaces
    pub watch_namespace: Option<String>,
    /// Port for the metrics and health server
    pub metrics_port: u16,
    /// Requeue delay after a ConfigMap is created
    pub create_requeue: Duration,
    /// Requeue delay after a reconciliation error
    pub error_requeue: Duration,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            metrics_port: DEFAULT_METRICS_PORT,
            create_requeue: Duration::from_secs(DEFAULT_CREATE_REQUEUE_SECS),
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
        }
    }
}

impl OperatorConfig {
    /// Load configuration from process environment variables
    ///
    /// - `WATCH_NAMESPACE`: namespace to watch (all namespaces when unset or empty)
    /// - `METRICS_PORT`: metrics server port
    /// - `CREATE_REQUEUE_SECS`: follow-up delay after creating a ConfigMap
    /// - `ERROR_REQUEUE_SECS`: retry delay after a failed reconciliation
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let watch_namespace = lookup("WATCH_NAMESPACE")
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty());

        let metrics_port = match lookup("METRICS_PORT") {
            Some(raw) => parse_number::<u16>("METRICS_PORT", &raw)?,
            None => defaults.metrics_port,
        };

        let create_requeue = match lookup("CREATE_REQUEUE_SECS") {
            Some(raw) => Duration::from_secs(parse_number("CREATE_REQUEUE_SECS", &raw)?),
            None => defaults.create_requeue,
        };

        let error_requeue = match lookup("ERROR_REQUEUE_SECS") {
            Some(raw) => Duration::from_secs(parse_number("ERROR_REQUEUE_SECS", &raw)?),
            None => defaults.error_requeue,
        };

        Ok(Self {
            watch_namespace,
            metrics_port,
            create_requeue,
            error_requeue,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::ConfigError(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}
