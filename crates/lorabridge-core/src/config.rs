//! Bridge configuration loaded from the Supervisor options file.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::mqtt::MqttConfig;

/// Options consumed by the bridge, in the add-on's flat `options.json`
/// schema.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// MQTT broker host.
    pub mqtt_host: String,

    /// MQTT broker port.
    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,

    /// MQTT username; empty disables authentication.
    #[serde(default)]
    pub mqtt_user: String,

    /// MQTT password.
    #[serde(default)]
    pub mqtt_password: String,

    /// Subscription topic prefix, including any trailing separator.
    pub topic_prefix: String,

    /// Debounce delay in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Field keys filtered out before classification.
    #[serde(default)]
    pub exclude_keys: HashSet<String>,

    /// Path of the persisted announcement cache.
    #[serde(default = "default_cache_file")]
    pub cache_file: String,

    /// Discovery topic prefix.
    #[serde(default = "default_discovery_prefix")]
    pub discovery_prefix: String,
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_cache_file() -> String {
    "/data/cache.json".to_string()
}

fn default_discovery_prefix() -> String {
    crate::discovery::DEFAULT_DISCOVERY_PREFIX.to_string()
}

impl BridgeConfig {
    /// Load options from a JSON file.
    ///
    /// Unlike the announcement cache, a missing or invalid options file is a
    /// startup error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            Error::Config(format!("cannot read options file {}: {}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            Error::Config(format!("invalid options file {}: {}", path.display(), e))
        })
    }

    /// Derive the MQTT client configuration.
    pub fn mqtt(&self) -> MqttConfig {
        let mut config = MqttConfig::new(self.mqtt_host.clone()).with_port(self.mqtt_port);
        if !self.mqtt_user.is_empty() {
            config = config.with_auth(self.mqtt_user.clone(), self.mqtt_password.clone());
        }
        config
    }

    /// Topic filter the bridge subscribes to.
    pub fn subscription_filter(&self) -> String {
        format!("{}#", self.topic_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_options() {
        let config: BridgeConfig = serde_json::from_str(
            r#"{
                "mqtt_host": "core-mosquitto",
                "mqtt_port": 1883,
                "mqtt_user": "bridge",
                "mqtt_password": "secret",
                "topic_prefix": "lora/",
                "debounce_ms": 250,
                "exclude_keys": ["rssi", "snr"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.mqtt_host, "core-mosquitto");
        assert_eq!(config.debounce_ms, 250);
        assert!(config.exclude_keys.contains("rssi"));
        assert_eq!(config.subscription_filter(), "lora/#");
        assert_eq!(config.cache_file, "/data/cache.json");
        assert_eq!(config.discovery_prefix, "homeassistant");

        let mqtt = config.mqtt();
        assert_eq!(mqtt.broker_addr(), "core-mosquitto:1883");
        assert_eq!(mqtt.username.as_deref(), Some("bridge"));
    }

    #[test]
    fn test_empty_user_disables_auth() {
        let config: BridgeConfig = serde_json::from_str(
            r#"{"mqtt_host": "localhost", "topic_prefix": "lora/"}"#,
        )
        .unwrap();

        let mqtt = config.mqtt();
        assert!(mqtt.username.is_none());
        assert!(mqtt.password.is_none());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BridgeConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
