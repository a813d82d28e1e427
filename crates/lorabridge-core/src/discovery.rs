//! Home Assistant MQTT discovery announcements.
//!
//! Each (device, field) pair maps to one entity. The first time an entity is
//! seen, a retained config message is published under
//! `<prefix>/<component>/<device_id>/<entity_key>/config`; the announcement
//! cache makes that a one-time event per topic, across restarts.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::cache::AnnouncementCache;
use crate::error::Result;
use crate::ident::{display_name, normalize_key};
use crate::mqtt::MqttPublisher;
use crate::value::{classify, Component, FieldValue, StateValue};

/// Manufacturer reported in every device metadata block.
pub const MANUFACTURER: &str = "MQTT/LoRa";

/// Default discovery topic prefix.
pub const DEFAULT_DISCOVERY_PREFIX: &str = "homeassistant";

/// Device metadata block embedded in discovery config payloads.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    /// Device identifiers.
    pub identifiers: Vec<String>,

    /// Device display name.
    pub name: String,

    /// Manufacturer label.
    pub manufacturer: String,

    /// Device model, when the gateway reports a type.
    pub model: Option<String>,
}

/// Discovery config payload, published retained once per entity.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryConfig {
    /// Entity display name.
    pub name: String,

    /// Topic the entity's state is published on.
    pub state_topic: String,

    /// Unique entity id.
    pub unique_id: String,

    /// Owning device metadata.
    pub device: DeviceInfo,

    /// Refresh the entity's last-updated time even on identical values.
    pub force_update: bool,

    /// Unit of measurement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
}

/// Build the discovery config topic for an entity.
pub fn config_topic(
    prefix: &str,
    component: Component,
    device_id: &str,
    entity_key: &str,
) -> String {
    format!(
        "{}/{}/{}/{}/config",
        prefix,
        component.as_str(),
        device_id,
        entity_key
    )
}

/// Build the state topic for an entity.
pub fn state_topic(
    prefix: &str,
    component: Component,
    device_id: &str,
    entity_key: &str,
) -> String {
    format!(
        "{}/{}/{}/{}/state",
        prefix,
        component.as_str(),
        device_id,
        entity_key
    )
}

/// A usable entity derived from one field, whether or not a config was
/// emitted for it this time.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Component the entity renders as.
    pub component: Component,

    /// Normalized field key.
    pub entity_key: String,

    /// State carried by this frame.
    pub state: StateValue,
}

/// Publishes discovery configs for not-yet-announced entities.
///
/// The cache is only ever touched from here, on the router task; debounce
/// timer callbacks never reach it.
pub struct DiscoveryAnnouncer {
    prefix: String,
    cache: AnnouncementCache,
    publisher: Arc<dyn MqttPublisher>,
}

impl DiscoveryAnnouncer {
    /// Create an announcer over `publisher`, deduplicating through `cache`.
    pub fn new(
        prefix: impl Into<String>,
        cache: AnnouncementCache,
        publisher: Arc<dyn MqttPublisher>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            cache,
            publisher,
        }
    }

    /// Topic prefix this announcer publishes under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Ensure the entity derived from (`device_id`, `key`, `value`) has a
    /// published discovery config.
    ///
    /// Returns `None` for unclassifiable values. Otherwise returns the
    /// entity; the retained config publish and cache flush happen only on
    /// the first sighting of the config topic. First-seen wins: an already
    /// announced topic is never re-announced, even if the unit or display
    /// name would differ now.
    pub async fn ensure_announced(
        &mut self,
        device_id: &str,
        key: &str,
        value: &FieldValue,
        device: &DeviceInfo,
    ) -> Result<Option<Entity>> {
        let Some(classified) = classify(value) else {
            return Ok(None);
        };
        let entity_key = normalize_key(key);
        let topic = config_topic(&self.prefix, classified.component, device_id, &entity_key);

        if !self.cache.is_announced(&topic) {
            let config = DiscoveryConfig {
                name: display_name(&entity_key),
                state_topic: state_topic(
                    &self.prefix,
                    classified.component,
                    device_id,
                    &entity_key,
                ),
                unique_id: format!("{}_{}", device_id, entity_key),
                device: device.clone(),
                force_update: true,
                unit_of_measurement: classified.unit.clone(),
            };
            let payload = serde_json::to_vec(&config)?;
            self.publisher.publish(&topic, payload, true).await?;
            self.cache.mark_announced(&topic);
            info!(topic = %topic, "announced new entity");
        }

        Ok(Some(Entity {
            component: classified.component,
            entity_key,
            state: classified.state,
        }))
    }
}
