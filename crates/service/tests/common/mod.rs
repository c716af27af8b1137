//! Shared helpers for relay integration tests
#![allow(dead_code)]

use std::time::Duration;

use service::{ApiClient, Config, ShutdownHandle};
use url::Url;

/// Relay config bound to an ephemeral loopback port
pub fn test_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        sweep_interval: Duration::from_millis(50),
        ..Config::default()
    }
}

/// Start a relay and return a client pointed at it
pub async fn spawn_relay(config: Config) -> (ApiClient, ShutdownHandle) {
    let (_, handle) = service::start_service(&config).await.unwrap();
    let url = Url::parse(&format!("http://{}", handle.local_addr())).unwrap();
    let client = ApiClient::new(&url).unwrap();
    (client, handle)
}

/// Stop the relay and make sure everything it spawned has exited
pub async fn stop_relay(handle: ShutdownHandle) {
    handle.shutdown();
    tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .expect("relay did not stop")
        .unwrap();
}
