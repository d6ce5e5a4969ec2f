//! In-process transient store backed by Moka.
//!
//! Each entry carries its own time-to-live, taken from the `ttl` passed
//! to `set`. Expired entries read as misses.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;
use tracing::debug;

use site_counts_sdk::HostError;
use site_counts_sdk::host::TransientStore;

/// A stored value plus the lifetime it was written with.
#[derive(Clone)]
struct Transient {
    value: Arc<str>,
    /// None = never expires.
    ttl: Option<Duration>,
}

/// Per-entry expiry policy: every write restarts the entry's clock.
struct TransientExpiry;

impl Expiry<String, Transient> for TransientExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Transient,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Transient,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Shared transient store.
///
/// Cloning is cheap; clones share the same entries. The store does not
/// serialize check-then-fill sequences: concurrent writers to one key
/// race and the last write wins.
#[derive(Clone)]
pub struct TransientCache {
    local: Cache<String, Transient>,
}

impl TransientCache {
    /// Create a store holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let local = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(TransientExpiry)
            .build();

        Self { local }
    }

    /// Get cache statistics (for monitoring).
    pub fn stats(&self) -> TransientStats {
        self.local.run_pending_tasks();
        TransientStats {
            entry_count: self.local.entry_count(),
        }
    }
}

impl TransientStore for TransientCache {
    fn get(&self, key: &str) -> Result<Option<String>, HostError> {
        let value = self.local.get(key).map(|t| t.value.to_string());
        if value.is_some() {
            debug!(key = %key, "transient hit");
        } else {
            debug!(key = %key, "transient miss");
        }
        Ok(value)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), HostError> {
        let ttl = (!ttl.is_zero()).then_some(ttl);
        self.local.insert(
            key.to_string(),
            Transient {
                value: Arc::from(value),
                ttl,
            },
        );
        debug!(key = %key, ttl_secs = ?ttl.map(|d| d.as_secs()), "transient set");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), HostError> {
        self.local.invalidate(key);
        debug!(key = %key, "transient deleted");
        Ok(())
    }
}

/// Transient store statistics.
#[derive(Debug, Clone)]
pub struct TransientStats {
    /// Number of live entries.
    pub entry_count: u64,
}

impl std::fmt::Debug for TransientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransientCache").finish()
    }
}
