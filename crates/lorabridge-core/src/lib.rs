//! LoRa telemetry to Home Assistant MQTT discovery bridge.
//!
//! Subscribes to raw gateway telemetry on an MQTT bus, infers a semantic
//! shape for each reported field, announces the matching Home Assistant
//! discovery config (once per entity, across restarts), and republishes the
//! value on the discovered state topic with per-entity debouncing.
//!
//! ## Pipeline
//!
//! inbound frame → [`router::MessageRouter`] decodes → per field:
//! [`value::classify`] determines the shape →
//! [`discovery::DiscoveryAnnouncer`] ensures the retained config exists
//! (consulting the persisted [`cache::AnnouncementCache`]) →
//! [`debounce::DebounceScheduler`] coalesces rapid updates into one state
//! publish.

pub mod cache;
pub mod config;
pub mod debounce;
pub mod discovery;
pub mod error;
pub mod ident;
pub mod mqtt;
pub mod router;
pub mod service;
pub mod value;

pub use cache::AnnouncementCache;
pub use config::BridgeConfig;
pub use debounce::{DebounceScheduler, StatePublish};
pub use discovery::{DeviceInfo, DiscoveryAnnouncer, DiscoveryConfig, Entity};
pub use error::{Error, Result};
pub use mqtt::{BridgeClient, MqttConfig, MqttPublisher};
pub use router::{Frame, MessageRouter, SensorIdentity};
pub use value::{classify, Classified, Component, FieldValue, StateValue};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
