/*!
Runtime configuration for the mesh status window.

Everything has a sensible default (the mesh daemon's dot-draw port on `localhost`),
and a handful of fields can be overridden through `MESH_STATUS_*` environment variables.
*/

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 2004;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_IDLE_CUTOFF: Duration = Duration::from_millis(300);
pub const DEFAULT_SELF_LABEL: &str = "Groundstation";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStatusConfig {
    pub host: String,
    pub port: u16,
    #[serde(with = "humantime_serde_compat")]
    pub poll_interval: Duration,
    /// Initial state of the auto-update checkbox.
    pub auto_update: bool,
    /// How long the stream may stay quiet (after data arrived) before the message is considered complete.
    #[serde(with = "humantime_serde_compat")]
    pub idle_cutoff: Duration,
    pub self_label: String,
    /// Additional address -> name entries on top of the built-in ones.
    pub extra_names: BTreeMap<String, String>,
}

impl Default for MeshStatusConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            auto_update: false,
            idle_cutoff: DEFAULT_IDLE_CUTOFF,
            self_label: DEFAULT_SELF_LABEL.to_string(),
            extra_names: BTreeMap::new(),
        }
    }
}

impl MeshStatusConfig {
    /// Defaults with overrides taken from the process environment.
    /// Invalid overrides are returned alongside the config; their fields keep the default.
    pub fn from_env() -> (Self, Vec<ConfigError>) {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> (Self, Vec<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        if let Some(host) = lookup("MESH_STATUS_HOST") {
            let host = host.trim().to_string();
            if host.is_empty() {
                errors.push(ConfigError::InvalidValue {
                    key: "MESH_STATUS_HOST",
                    value: host,
                    reason: "host must not be empty".to_string(),
                });
            } else {
                self.host = host;
            }
        }

        if let Some(port) = lookup("MESH_STATUS_PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) if p != 0 => self.port = p,
                Ok(_) => errors.push(ConfigError::InvalidValue {
                    key: "MESH_STATUS_PORT",
                    value: port,
                    reason: "port must be non-zero".to_string(),
                }),
                Err(e) => errors.push(ConfigError::InvalidValue {
                    key: "MESH_STATUS_PORT",
                    value: port,
                    reason: e.to_string(),
                }),
            }
        }

        if let Some(ms) = lookup("MESH_STATUS_INTERVAL_MS") {
            match ms.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.poll_interval = Duration::from_millis(ms),
                Ok(_) => errors.push(ConfigError::InvalidValue {
                    key: "MESH_STATUS_INTERVAL_MS",
                    value: ms,
                    reason: "interval must be positive".to_string(),
                }),
                Err(e) => errors.push(ConfigError::InvalidValue {
                    key: "MESH_STATUS_INTERVAL_MS",
                    value: ms,
                    reason: e.to_string(),
                }),
            }
        }

        if let Some(flag) = lookup("MESH_STATUS_AUTO_UPDATE") {
            match parse_flag(&flag) {
                Some(b) => self.auto_update = b,
                None => errors.push(ConfigError::InvalidValue {
                    key: "MESH_STATUS_AUTO_UPDATE",
                    value: flag,
                    reason: "expected one of 1/0/true/false/on/off".to_string(),
                }),
            }
        }

        if let Some(label) = lookup("MESH_STATUS_SELF_LABEL") {
            if !label.trim().is_empty() {
                self.self_label = label.trim().to_string();
            }
        }

        (self, errors)
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Durations are (de)serialized as humantime strings ("1s", "300ms").
mod humantime_serde_compat {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(d)?;
        humantime::parse_duration(&s).map_err(D::Error::custom)
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
    fn test_defaults_point_at_local_dot_draw() {
        let config = MeshStatusConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 2004);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(!config.auto_update);
    }

    #[test]
    fn test_env_overrides_applied() {
        let (config, errors) = MeshStatusConfig::default().with_overrides(lookup_from(&[
            ("MESH_STATUS_HOST", "10.0.0.7"),
            ("MESH_STATUS_PORT", "2006"),
            ("MESH_STATUS_INTERVAL_MS", "250"),
            ("MESH_STATUS_AUTO_UPDATE", "on"),
            ("MESH_STATUS_SELF_LABEL", "GCS"),
        ]));
        assert!(errors.is_empty());
        assert_eq!(config.host, "10.0.0.7");
        assert_eq!(config.port, 2006);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert!(config.auto_update);
        assert_eq!(config.self_label, "GCS");
    }

    #[test]
    fn test_invalid_overrides_keep_defaults() {
        let (config, errors) = MeshStatusConfig::default().with_overrides(lookup_from(&[
            ("MESH_STATUS_PORT", "not-a-port"),
            ("MESH_STATUS_INTERVAL_MS", "0"),
            ("MESH_STATUS_AUTO_UPDATE", "maybe"),
        ]));
        assert_eq!(errors.len(), 3);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(!config.auto_update);
    }

    #[test]
    fn test_config_json_uses_humantime() {
        let json = serde_json::to_string(&MeshStatusConfig::default()).unwrap();
        assert!(json.contains("\"poll_interval\":\"1s\""));
        let back: MeshStatusConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MeshStatusConfig::default());
    }
}
