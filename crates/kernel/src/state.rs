//! Kernel state shared by every render.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use site_counts_sdk::HostError;
use site_counts_sdk::block::{BlockAttributes, HOOK_INIT, RenderContext};
use site_counts_sdk::host::TransientStore;
use site_counts_sdk::i18n::{Catalog, IdentityCatalog};

use crate::blocks::BlockRegistry;
use crate::cache::TransientCache;
use crate::config::Config;
use crate::hooks::HookRegistry;
use crate::locale::PoCatalog;

/// Owns the host services blocks render against.
///
/// Plugins queue their setup on [`Kernel::hooks_mut`]; [`Kernel::boot`]
/// fires the `init` hook once, after which blocks can be rendered.
pub struct Kernel {
    config: Config,
    transients: TransientCache,
    catalog: Arc<dyn Catalog>,
    hooks: HookRegistry,
    blocks: BlockRegistry,
    booted: bool,
}

impl Kernel {
    /// Build a kernel from configuration.
    ///
    /// Loads translation catalogs when `locale_dir` is set.
    pub fn new(config: Config) -> Result<Self> {
        let catalog: Arc<dyn Catalog> = match &config.locale_dir {
            Some(dir) => Arc::new(
                PoCatalog::load_dir(dir, &config.language)
                    .context("failed to load translation catalogs")?,
            ),
            None => Arc::new(IdentityCatalog),
        };

        Ok(Self::with_catalog(config, catalog))
    }

    /// Build a kernel with an explicit catalog.
    pub fn with_catalog(config: Config, catalog: Arc<dyn Catalog>) -> Self {
        let transients = TransientCache::new(config.transient_max_capacity);
        Self {
            config,
            transients,
            catalog,
            hooks: HookRegistry::new(),
            blocks: BlockRegistry::new(),
            booted: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory of the plugin named `name` under the plugins root.
    pub fn plugin_dir(&self, name: &str) -> PathBuf {
        self.config.plugins_dir.join(name)
    }

    pub fn transients(&self) -> &TransientCache {
        &self.transients
    }

    /// Transient store handle for plugins. Shares entries with the kernel.
    pub fn transient_store(&self) -> Arc<dyn TransientStore> {
        Arc::new(self.transients.clone())
    }

    pub fn catalog(&self) -> Arc<dyn Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Hook registry, for plugins to queue lifecycle callbacks.
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlockRegistry {
        &mut self.blocks
    }

    /// Fire the `init` hook. Later calls do nothing.
    pub fn boot(&mut self) -> Result<(), HostError> {
        if self.booted {
            return Ok(());
        }
        let handlers = self.hooks.do_action(HOOK_INIT, &mut self.blocks)?;
        self.booted = true;
        info!(
            init_handlers = handlers,
            blocks = self.blocks.len(),
            "kernel booted"
        );
        Ok(())
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Render a registered block.
    pub fn render_block(
        &self,
        name: &str,
        attributes: &BlockAttributes,
        context: &RenderContext,
    ) -> Result<String, HostError> {
        self.blocks.render(name, attributes, context)
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("config", &self.config)
            .field("blocks", &self.blocks.block_names())
            .field("booted", &self.booted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use site_counts_sdk::block::{ActionRegistrar, BlockRegistrar};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn boot_fires_init_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut kernel = Kernel::new(Config::default()).unwrap();
        let counter = Arc::clone(&calls);
        kernel.hooks_mut().add_action(
            HOOK_INIT,
            0,
            Box::new(move |_: &mut dyn BlockRegistrar| -> Result<(), HostError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        kernel.boot().unwrap();
        kernel.boot().unwrap();
        assert!(kernel.is_booted());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_boot_can_be_retried() {
        let mut kernel = Kernel::new(Config::default()).unwrap();
        kernel.hooks_mut().add_action(
            HOOK_INIT,
            0,
            Box::new(|_: &mut dyn BlockRegistrar| -> Result<(), HostError> {
                Err(HostError::Manifest("missing".into()))
            }),
        );
        assert!(kernel.boot().is_err());
        assert!(!kernel.is_booted());
    }

    #[test]
    fn render_unknown_block_fails() {
        let kernel = Kernel::new(Config::default()).unwrap();
        let err = kernel
            .render_block("xwp/site-counts", &BlockAttributes::new(), &RenderContext::default())
            .unwrap_err();
        assert!(matches!(err, HostError::UnknownBlock(_)));
    }

    #[test]
    fn transient_store_shares_entries() {
        let kernel = Kernel::new(Config::default()).unwrap();
        let store = kernel.transient_store();
        store
            .set("k", "v", std::time::Duration::from_secs(60))
            .unwrap();
        assert_eq!(kernel.transients().get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn plugin_dir_joins_plugins_root() {
        let config = Config {
            plugins_dir: "/srv/plugins".into(),
            ..Config::default()
        };
        let kernel = Kernel::new(config).unwrap();
        assert_eq!(
            kernel.plugin_dir("site_counts"),
            PathBuf::from("/srv/plugins/site_counts")
        );
    }

    #[test]
    fn missing_locale_dir_is_an_error() {
        let config = Config {
            locale_dir: Some("/nonexistent/languages".into()),
            ..Config::default()
        };
        let err = Kernel::new(config).unwrap_err();
        assert!(err.to_string().contains("translation catalogs"));
    }
}
