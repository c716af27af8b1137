//! In-memory, one-time-read blob store
//!
//! Every blob moves through `absent -> present -> {delivered, expired} -> absent`.
//! Mutations take the store-wide write lock, so for any code id exactly one of many
//! concurrent fetches can observe the blob. Lock hold time is a single map operation;
//! payload bytes are moved, never copied, while the lock is held.

pub mod sweeper;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

/// An encrypted payload held by the relay
#[derive(Debug)]
pub struct Blob {
    data: Vec<u8>,
    created_at: Instant,
    ttl: Duration,
}

impl Blob {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }
}

/// Concurrent map from code id to blob with TTL and fetch-once semantics
///
/// Construct one per process and share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob under `code_id` for at most `ttl`
    ///
    /// Returns `false`, leaving the store untouched, if a live blob already holds the id.
    /// The caller should treat that as a collision and retry with a fresh code. A blob
    /// whose TTL has run out no longer counts as present and is replaced.
    pub fn put(&self, code_id: &str, data: Vec<u8>, ttl: Duration) -> bool {
        let now = Instant::now();
        let mut blobs = self.blobs.write();

        match blobs.entry(code_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if !entry.get().is_expired(now) {
                    return false;
                }
                entry.insert(Blob::new(data, ttl));
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(Blob::new(data, ttl));
                true
            }
        }
    }

    /// Remove the blob under `code_id` and hand it out if it is still live
    ///
    /// Expired blobs are removed too but never returned. Missing, already delivered and
    /// expired all come back as `None`.
    pub fn get_and_delete(&self, code_id: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let blob = self.blobs.write().remove(code_id)?;

        if blob.is_expired(now) {
            return None;
        }
        Some(blob.data)
    }

    /// Drop every blob older than its TTL, returning how many were removed
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut blobs = self.blobs.write();

        let before = blobs.len();
        blobs.retain(|_, blob| !blob.is_expired(now));
        before - blobs.len()
    }

    /// Number of live blobs; expired entries waiting for the sweeper are not counted
    pub fn count(&self) -> usize {
        let now = Instant::now();
        self.blobs
            .read()
            .values()
            .filter(|blob| !blob.is_expired(now))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_put_then_get_once() {
        let store = BlobStore::new();
        assert!(store.put("abc", b"payload".to_vec(), HOUR));
        assert_eq!(store.count(), 1);

        assert_eq!(store.get_and_delete("abc"), Some(b"payload".to_vec()));
        assert_eq!(store.get_and_delete("abc"), None);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_get_missing() {
        let store = BlobStore::new();
        assert_eq!(store.get_and_delete("nope"), None);
    }

    #[test]
    fn test_duplicate_put_keeps_first() {
        let store = BlobStore::new();
        assert!(store.put("abc", b"first".to_vec(), HOUR));
        assert!(!store.put("abc", b"second".to_vec(), HOUR));
        assert_eq!(store.count(), 1);

        assert_eq!(store.get_and_delete("abc"), Some(b"first".to_vec()));
    }

    #[test]
    fn test_expired_blob_is_not_returned() {
        let store = BlobStore::new();
        assert!(store.put("abc", b"payload".to_vec(), Duration::from_millis(1)));

        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(store.get_and_delete("abc"), None);
        // the expired entry is gone, not just hidden
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_put_replaces_expired_blob() {
        let store = BlobStore::new();
        assert!(store.put("abc", b"old".to_vec(), Duration::from_millis(1)));

        std::thread::sleep(Duration::from_millis(20));

        assert!(store.put("abc", b"new".to_vec(), HOUR));
        assert_eq!(store.get_and_delete("abc"), Some(b"new".to_vec()));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = BlobStore::new();
        assert!(store.put("short", b"a".to_vec(), Duration::from_millis(1)));
        assert!(store.put("long", b"b".to_vec(), HOUR));

        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(store.sweep(), 1);
        assert_eq!(store.count(), 1);
        assert_eq!(store.sweep(), 0);
        assert_eq!(store.get_and_delete("long"), Some(b"b".to_vec()));
    }

    #[test]
    fn test_concurrent_fetch_delivers_once() {
        let store = Arc::new(BlobStore::new());

        for round in 0..20 {
            let id = format!("race{round}");
            assert!(store.put(&id, b"payload".to_vec(), HOUR));

            let barrier = Arc::new(std::sync::Barrier::new(8));
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    let barrier = barrier.clone();
                    let id = id.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        store.get_and_delete(&id)
                    })
                })
                .collect();

            let delivered = handles
                .into_iter()
                .filter_map(|h| h.join().unwrap())
                .count();
            assert_eq!(delivered, 1, "round {round}");
        }
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_concurrent_put_single_winner() {
        let store = Arc::new(BlobStore::new());

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.put("shared", vec![i], HOUR))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.count(), 1);
    }
}
