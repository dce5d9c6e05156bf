// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{Result, WatcherError};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which event source delivers namespace events to the decision logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// Cached, filtered, level-triggered reconciliation with finalizer coordination
    Reconciler,
    /// Raw watch stream reacting to added namespaces only
    Watch,
    /// Cached watch acting once on the first sighting of each namespace
    Informer,
}

impl FromStr for WatchMode {
    type Err = WatcherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reconciler" => Ok(WatchMode::Reconciler),
            "watch" => Ok(WatchMode::Watch),
            "informer" => Ok(WatchMode::Informer),
            other => Err(WatcherError::ConfigError(format!(
                "WATCH_MODE must be 'reconciler', 'watch' or 'informer', got '{}'",
                other
            ))),
        }
    }
}

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespaces that are never claimed or provisioned, in the order given
    pub excluded_namespaces: Vec<String>,
    pub health_probe_port: u16,
    pub watch_mode: WatchMode,
    pub reconcile_workers: u16,
    pub cache_sync_timeout: Duration,
    pub restart_backoff_initial: Duration,
    pub restart_backoff_max: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            excluded_namespaces: Vec::new(),
            health_probe_port: 8081,
            watch_mode: WatchMode::Reconciler,
            reconcile_workers: 4,
            cache_sync_timeout: Duration::from_secs(60),
            restart_backoff_initial: Duration::from_millis(500),
            restart_backoff_max: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup, unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let excluded_namespaces = lookup("EXCLUDED_NAMESPACES")
            .map(|v| parse_namespace_list(&v))
            .unwrap_or_default();

        let watch_mode = match lookup("WATCH_MODE") {
            Some(v) => v.parse()?,
            None => defaults.watch_mode,
        };

        let health_probe_port =
            parse_or(&lookup, "HEALTH_PROBE_PORT", defaults.health_probe_port)?;

        let reconcile_workers =
            parse_or(&lookup, "RECONCILE_WORKERS", defaults.reconcile_workers)?;
        if reconcile_workers == 0 {
            return Err(WatcherError::ConfigError(
                "RECONCILE_WORKERS must be greater than zero".to_string(),
            ));
        }

        let cache_sync_timeout = Duration::from_secs(parse_or(
            &lookup,
            "CACHE_SYNC_TIMEOUT_SECS",
            defaults.cache_sync_timeout.as_secs(),
        )?);
        let restart_backoff_initial = Duration::from_millis(parse_or(
            &lookup,
            "RESTART_BACKOFF_INITIAL_MS",
            defaults.restart_backoff_initial.as_millis() as u64,
        )?);
        let restart_backoff_max = Duration::from_secs(parse_or(
            &lookup,
            "RESTART_BACKOFF_MAX_SECS",
            defaults.restart_backoff_max.as_secs(),
        )?);

        if restart_backoff_initial > restart_backoff_max {
            return Err(WatcherError::ConfigError(
                "RESTART_BACKOFF_INITIAL_MS must not exceed RESTART_BACKOFF_MAX_SECS".to_string(),
            ));
        }

        Ok(Config {
            excluded_namespaces,
            health_probe_port,
            watch_mode,
            reconcile_workers,
            cache_sync_timeout,
            restart_backoff_initial,
            restart_backoff_max,
        })
    }
}

fn parse_namespace_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| WatcherError::ConfigError(format!("{} is invalid: {}", key, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert!(config.excluded_namespaces.is_empty());
        assert_eq!(config.health_probe_port, 8081);
        assert_eq!(config.watch_mode, WatchMode::Reconciler);
        assert_eq!(config.reconcile_workers, 4);
    }

    #[test]
    fn test_excluded_namespaces_trimmed_and_ordered() {
        let config = Config::from_lookup(lookup_from(&[(
            "EXCLUDED_NAMESPACES",
            "kube-system, default,,kube-public ",
        )]))
        .unwrap();

        assert_eq!(
            config.excluded_namespaces,
            vec!["kube-system", "default", "kube-public"]
        );
    }

    #[test]
    fn test_watch_mode_parsing() {
        let config = Config::from_lookup(lookup_from(&[("WATCH_MODE", "Watch")])).unwrap();
        assert_eq!(config.watch_mode, WatchMode::Watch);

        let config = Config::from_lookup(lookup_from(&[("WATCH_MODE", " informer ")])).unwrap();
        assert_eq!(config.watch_mode, WatchMode::Informer);

        let err = Config::from_lookup(lookup_from(&[("WATCH_MODE", "poll")])).unwrap_err();
        assert!(matches!(err, WatcherError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err =
            Config::from_lookup(lookup_from(&[("HEALTH_PROBE_PORT", "not-a-port")])).unwrap_err();
        assert!(err.to_string().contains("HEALTH_PROBE_PORT"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = Config::from_lookup(lookup_from(&[("RECONCILE_WORKERS", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_backoff_bounds() {
        let config = Config::from_lookup(lookup_from(&[
            ("RESTART_BACKOFF_INITIAL_MS", "250"),
            ("RESTART_BACKOFF_MAX_SECS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.restart_backoff_initial, Duration::from_millis(250));
        assert_eq!(config.restart_backoff_max, Duration::from_secs(10));

        let result = Config::from_lookup(lookup_from(&[
            ("RESTART_BACKOFF_INITIAL_MS", "5000"),
            ("RESTART_BACKOFF_MAX_SECS", "1"),
        ]));
        assert!(result.is_err());
    }
}
