//! Inbound frame routing.
//!
//! One router instance handles all bus traffic sequentially: decode the
//! frame, extract the device identity, then drive the discovery and debounce
//! components once per field.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::debounce::{DebounceScheduler, StatePublish};
use crate::discovery::{state_topic, DeviceInfo, DiscoveryAnnouncer, MANUFACTURER};
use crate::value::FieldValue;

/// Device identity block of a gateway frame.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorIdentity {
    /// Stable device identifier. Frames without one are dropped.
    #[serde(rename = "deviceId")]
    pub device_id: Option<String>,

    /// Display alias; defaults to the identifier.
    pub alias: Option<String>,

    /// Device type label, reported as the model.
    #[serde(rename = "type")]
    pub device_type: Option<String>,
}

/// One gateway frame: device identity plus a field map.
#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    /// Reporting device.
    pub sensor: Option<SensorIdentity>,

    /// Field key mapped to its value object.
    #[serde(default)]
    pub message: HashMap<String, FieldValue>,
}

/// Drives the pipeline for each inbound bus message.
pub struct MessageRouter {
    exclude_keys: HashSet<String>,
    announcer: DiscoveryAnnouncer,
    scheduler: DebounceScheduler,
}

impl MessageRouter {
    /// Create a router.
    ///
    /// `exclude_keys` are raw field keys filtered out before any entity is
    /// derived.
    pub fn new(
        exclude_keys: HashSet<String>,
        announcer: DiscoveryAnnouncer,
        scheduler: DebounceScheduler,
    ) -> Self {
        Self {
            exclude_keys,
            announcer,
            scheduler,
        }
    }

    /// Handle one inbound bus payload.
    ///
    /// Undecodable payloads are dropped silently; the bus may carry
    /// unrelated non-JSON traffic under the same prefix.
    pub async fn handle_payload(&mut self, payload: &[u8]) {
        let frame: Frame = match serde_json::from_slice(payload) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("dropping undecodable frame: {}", e);
                return;
            }
        };
        self.handle_frame(frame).await;
    }

    /// Handle one decoded frame.
    ///
    /// Fields are independent: classification and config publication for one
    /// field never depends on another field in the same frame.
    pub async fn handle_frame(&mut self, frame: Frame) {
        let Some(sensor) = frame.sensor else {
            debug!("dropping frame without sensor block");
            return;
        };
        let Some(device_id) = sensor.device_id.filter(|id| !id.is_empty()) else {
            debug!("dropping frame without device identifier");
            return;
        };

        let device = DeviceInfo {
            identifiers: vec![device_id.clone()],
            name: sensor.alias.unwrap_or_else(|| device_id.clone()),
            manufacturer: MANUFACTURER.to_string(),
            model: sensor.device_type,
        };

        for (key, value) in &frame.message {
            if self.exclude_keys.contains(key) {
                continue;
            }

            let entity = match self
                .announcer
                .ensure_announced(&device_id, key, value, &device)
                .await
            {
                Ok(Some(entity)) => entity,
                Ok(None) => continue,
                Err(e) => {
                    warn!(device = %device_id, key = %key, "discovery publish failed: {}", e);
                    continue;
                }
            };

            // The publish action captures topic and payload by value; a
            // superseding update for the same key simply replaces it.
            let publish = StatePublish {
                topic: state_topic(
                    self.announcer.prefix(),
                    entity.component,
                    &device_id,
                    &entity.entity_key,
                ),
                payload: entity.state.to_string(),
            };
            let debounce_key = format!("{}_{}", device_id, entity.entity_key);
            self.scheduler.schedule(&debounce_key, publish);
        }
    }
}
