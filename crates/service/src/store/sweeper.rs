//! Periodic expiry sweep for the blob store
//!
//! `get_and_delete` already refuses expired blobs; the sweeper only reclaims memory for
//! blobs nobody came to collect.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::BlobStore;

/// Spawn the sweeper task
///
/// The task runs `sweep` once per `interval` and exits as soon as `shutdown_rx` fires or
/// its sender is dropped. Await the returned handle on shutdown so the sweeper never
/// outlives the service.
pub fn spawn(
    store: Arc<BlobStore>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<()>,
) -> JoinHandle<()> {
    // tokio panics on a zero period
    let interval = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(interval_ms = interval.as_millis() as u64, "blob sweeper started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.sweep();
                    if removed > 0 {
                        tracing::info!(removed, remaining = store.count(), "swept expired blobs");
                    }
                }
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }
        tracing::debug!("blob sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_blobs() {
        let store = Arc::new(BlobStore::new());
        assert!(store.put("short", b"a".to_vec(), Duration::from_secs(5)));
        assert!(store.put("long", b"b".to_vec(), Duration::from_secs(3600)));

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let handle = spawn(store.clone(), Duration::from_secs(30), shutdown_rx);

        // first tick fires one interval after start, not immediately
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.count(), 2);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(store.count(), 1);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_on_signal() {
        let store = Arc::new(BlobStore::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let handle = spawn(store, Duration::from_secs(30), shutdown_rx);

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_when_sender_dropped() {
        let store = Arc::new(BlobStore::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let handle = spawn(store, Duration::from_secs(30), shutdown_rx);

        drop(shutdown_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
