//! Bridge service: transport wiring and the receive loop.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{Event, Packet};
use tracing::{info, warn};

use crate::cache::AnnouncementCache;
use crate::config::BridgeConfig;
use crate::debounce::DebounceScheduler;
use crate::discovery::DiscoveryAnnouncer;
use crate::error::Result;
use crate::mqtt::BridgeClient;
use crate::router::MessageRouter;

/// Delay before re-polling the event loop after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Run the bridge until the process is stopped.
///
/// A single task drives reception and dispatch sequentially; only the
/// debounce timers run concurrently with it.
pub async fn run(config: BridgeConfig) -> Result<()> {
    let mqtt_config = config.mqtt();
    let (client, mut event_loop) = BridgeClient::connect(&mqtt_config);
    let client = Arc::new(client);

    let cache = AnnouncementCache::load(&config.cache_file);
    let announcer =
        DiscoveryAnnouncer::new(config.discovery_prefix.clone(), cache, client.clone());
    let scheduler =
        DebounceScheduler::new(Duration::from_millis(config.debounce_ms), client.clone());
    let mut router = MessageRouter::new(config.exclude_keys.clone(), announcer, scheduler);

    let filter = config.subscription_filter();
    info!(broker = %mqtt_config.broker_addr(), filter = %filter, "starting bridge");

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                // The broker needs the subscription again after every
                // (re)connect.
                info!("connected to broker");
                if let Err(e) = client.subscribe(&filter).await {
                    warn!(filter = %filter, "subscribe failed: {}", e);
                } else {
                    info!(filter = %filter, "subscribed");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                router.handle_payload(&publish.payload).await;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("MQTT connection error, retrying: {}", e);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
