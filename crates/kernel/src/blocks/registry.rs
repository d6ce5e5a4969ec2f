//! Registry of renderable blocks.
//!
//! Maps block names to their manifest metadata and render callback.
//! Registering a name twice replaces the earlier entry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use site_counts_sdk::HostError;
use site_counts_sdk::block::{
    BlockAttributes, BlockMetadata, BlockRegistrar, BlockRenderer, RenderContext,
};

use super::manifest;

/// A registered block.
#[derive(Clone)]
pub struct RegisteredBlock {
    pub metadata: BlockMetadata,
    pub renderer: Arc<dyn BlockRenderer>,
}

impl std::fmt::Debug for RegisteredBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredBlock")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Registry of blocks, keyed by block name.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    blocks: HashMap<String, RegisteredBlock>,
}

impl BlockRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block, replacing any block with the same name.
    pub fn register(&mut self, metadata: BlockMetadata, renderer: Arc<dyn BlockRenderer>) {
        let replaced = self.blocks.contains_key(&metadata.name);
        info!(block = %metadata.name, replaced, "block registered");
        self.blocks
            .insert(metadata.name.clone(), RegisteredBlock { metadata, renderer });
    }

    /// Look up a block by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredBlock> {
        self.blocks.get(name)
    }

    /// Check whether a block is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    /// Return the number of registered blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// List all registered block names.
    pub fn block_names(&self) -> Vec<String> {
        self.blocks.keys().cloned().collect()
    }

    /// Render a block instance.
    ///
    /// Manifest attribute defaults fill in attributes the instance left
    /// unset. Renderer errors are returned untouched.
    pub fn render(
        &self,
        name: &str,
        attributes: &BlockAttributes,
        context: &RenderContext,
    ) -> Result<String, HostError> {
        let block = self
            .get(name)
            .ok_or_else(|| HostError::UnknownBlock(name.to_string()))?;

        let mut attributes = attributes.clone();
        for (attr, definition) in &block.metadata.attributes {
            if let Some(default) = &definition.default {
                attributes.set_default(attr, default.clone());
            }
        }

        block.renderer.render(&attributes, context)
    }
}

impl BlockRegistrar for BlockRegistry {
    fn register_block_from_metadata(
        &mut self,
        dir: &Path,
        renderer: Arc<dyn BlockRenderer>,
    ) -> Result<(), HostError> {
        let metadata =
            manifest::load_manifest(dir).map_err(|e| HostError::Manifest(format!("{e:#}")))?;
        self.register(metadata, renderer);
        Ok(())
    }
}
