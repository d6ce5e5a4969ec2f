//! Errors raised by host services.
//!
//! Host services report failures as [`HostError`]. Blocks never catch
//! these: they propagate to whatever dispatched the render, which owns
//! fallback behavior.

use thiserror::Error;

/// Failure reported by a host service or by the block dispatch path.
#[derive(Debug, Error)]
pub enum HostError {
    /// The transient store could not be read or written.
    #[error("transient store error: {0}")]
    Cache(String),

    /// The item query engine failed.
    #[error("item query error: {0}")]
    Query(String),

    /// The content-type registry failed.
    #[error("content type registry error: {0}")]
    Registry(String),

    /// A block manifest was missing or invalid.
    #[error("block manifest error: {0}")]
    Manifest(String),

    /// No block is registered under the requested name.
    #[error("unknown block type '{0}'")]
    UnknownBlock(String),

    /// A value could not be encoded for storage.
    #[error("serialization error: {0}")]
    Codec(#[from] serde_json::Error),
}
