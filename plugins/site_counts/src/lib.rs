//! Site Counts block plugin.
//!
//! Renders the `xwp/site-counts` block: a per-content-type item count and
//! a listing of the posts tagged `foo` in category `baz`. Both aggregates
//! are kept in transients for a day.

mod counts;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use site_counts_sdk::prelude::*;

pub use counts::{
    CATEGORY_NAME, POST_COUNTS_KEY, SITE_COUNTS_KEY, TAG_SLUG, TRANSIENT_TTL, filtered_query,
};

/// Registered block name, as declared in `block.toml`.
pub const BLOCK_NAME: &str = "xwp/site-counts";

/// Translation domain for the block's strings.
pub const TEXT_DOMAIN: &str = "site-counts";

/// The Site Counts block.
#[derive(Debug, Clone)]
pub struct SiteCountsBlock {
    dir: PathBuf,
    services: HostServices,
}

impl SiteCountsBlock {
    /// Create the block. `dir` is where its `block.toml` lives.
    pub fn new(dir: impl Into<PathBuf>, services: HostServices) -> Self {
        Self {
            dir: dir.into(),
            services,
        }
    }

    /// Create the block with the manifest shipped in this crate.
    pub fn bundled(services: HostServices) -> Self {
        Self::new(env!("CARGO_MANIFEST_DIR"), services)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Queue block registration on the `init` hook.
    pub fn init(self: &Arc<Self>, hooks: &mut dyn ActionRegistrar) {
        let block = Arc::clone(self);
        hooks.add_action(
            HOOK_INIT,
            0,
            Box::new(move |registrar: &mut dyn BlockRegistrar| block.register_block(registrar)),
        );
    }

    /// Register the block from its manifest, bound to this renderer.
    pub fn register_block(
        self: &Arc<Self>,
        registrar: &mut dyn BlockRegistrar,
    ) -> Result<(), HostError> {
        let renderer: Arc<dyn BlockRenderer> = Arc::<SiteCountsBlock>::clone(self);
        registrar.register_block_from_metadata(&self.dir, renderer)
    }
}

impl BlockRenderer for SiteCountsBlock {
    fn render(
        &self,
        attributes: &BlockAttributes,
        context: &RenderContext,
    ) -> Result<String, HostError> {
        render::render_markup(&self.services, attributes, context)
    }
}
