//! Host service contracts.
//!
//! The kernel (or any embedding framework) implements these traits and
//! hands them to plugins. All calls are synchronous and request-scoped.

use std::sync::Arc;
use std::time::Duration;

use crate::HostError;
use crate::i18n::Catalog;
use crate::types::{ItemQuery, QueryResult};

/// Time-limited key-value store shared across requests.
pub trait TransientStore: Send + Sync {
    /// Fetch a stored value. `Ok(None)` means absent or expired.
    fn get(&self, key: &str) -> Result<Option<String>, HostError>;

    /// Store a value for `ttl`. A zero `ttl` never expires.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), HostError>;

    /// Remove a value.
    fn delete(&self, key: &str) -> Result<(), HostError>;
}

/// Registry of content types known to the host.
pub trait ContentTypeSource: Send + Sync {
    /// Machine names of every publicly visible content type.
    fn public_content_types(&self) -> Result<Vec<String>, HostError>;
}

/// The host's item query engine.
pub trait ItemQueryService: Send + Sync {
    /// Count every item matching `query`, ignoring its limit.
    fn count(&self, query: &ItemQuery) -> Result<u64, HostError>;

    /// Run `query` and return the total match count plus the items.
    fn query(&self, query: &ItemQuery) -> Result<QueryResult, HostError>;
}

/// The set of host services a block renders against.
#[derive(Clone)]
pub struct HostServices {
    pub transients: Arc<dyn TransientStore>,
    pub content_types: Arc<dyn ContentTypeSource>,
    pub items: Arc<dyn ItemQueryService>,
    pub catalog: Arc<dyn Catalog>,
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
