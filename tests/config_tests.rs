//! Tests for environment-driven operator configuration

use std::collections::HashMap;
use std::time::Duration;

use guestbook_operator::config::OperatorConfig;
use guestbook_operator::Error;

fn load(vars: &[(&str, &str)]) -> guestbook_operator::Result<OperatorConfig> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    OperatorConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_when_nothing_is_set() {
    let config = load(&[]).unwrap();
    assert_eq!(config, OperatorConfig::default());
    assert_eq!(config.watch_namespace, None);
    assert_eq!(config.metrics_port, 8080);
    assert_eq!(config.create_requeue, Duration::from_secs(5));
    assert_eq!(config.error_requeue, Duration::from_secs(30));
}

#[test]
fn reads_all_variables() {
    let config = load(&[
        ("WATCH_NAMESPACE", "guestbook"),
        ("METRICS_PORT", "9100"),
        ("CREATE_REQUEUE_SECS", "1"),
        ("ERROR_REQUEUE_SECS", " 120 "),
    ])
    .unwrap();

    assert_eq!(config.watch_namespace.as_deref(), Some("guestbook"));
    assert_eq!(config.metrics_port, 9100);
    assert_eq!(config.create_requeue, Duration::from_secs(1));
    assert_eq!(config.error_requeue, Duration::from_secs(120));
}

#[test]
fn blank_namespace_watches_everything() {
    let config = load(&[("WATCH_NAMESPACE", "  ")]).unwrap();
    assert_eq!(config.watch_namespace, None);
}

#[test]
fn malformed_numbers_are_rejected() {
    let err = load(&[("METRICS_PORT", "http")]).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
    assert!(err.to_string().contains("METRICS_PORT"));

    let err = load(&[("ERROR_REQUEUE_SECS", "-1")]).unwrap_err();
    assert!(err.to_string().contains("ERROR_REQUEUE_SECS"));
}
