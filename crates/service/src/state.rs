use std::sync::Arc;
use std::time::Duration;

use super::config::Config;
use super::store::BlobStore;

/// Shared relay state, cloned into every request handler
#[derive(Clone, Debug)]
pub struct State {
    store: Arc<BlobStore>,
    max_ttl: Duration,
    max_payload_size: usize,
}

impl State {
    pub fn from_config(config: &Config) -> Self {
        Self {
            store: Arc::new(BlobStore::new()),
            max_ttl: config.max_ttl,
            max_payload_size: config.max_payload_size,
        }
    }

    pub fn store(&self) -> &Arc<BlobStore> {
        &self.store
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// TTL actually applied to a blob; `0` asks for the relay maximum
    pub fn effective_ttl(&self, requested_secs: u64) -> Duration {
        if requested_secs == 0 {
            return self.max_ttl;
        }
        Duration::from_secs(requested_secs).min(self.max_ttl)
    }
}
