//! Lifecycle hook registry.
//!
//! Maps hook names to an ordered list of callbacks. Callbacks run by
//! weight (lower first); equal weights keep registration order.

use std::collections::HashMap;

use tracing::debug;

use site_counts_sdk::HostError;
use site_counts_sdk::block::{ActionCallback, ActionRegistrar, BlockRegistrar};

/// A queued callback with its ordering weight.
struct HookHandler {
    weight: i32,
    callback: ActionCallback,
}

/// Registry mapping hook names to ordered callbacks.
#[derive(Default)]
pub struct HookRegistry {
    handlers: HashMap<String, Vec<HookHandler>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback queued on `hook`, in weight order.
    ///
    /// Stops at the first failing callback and returns its error.
    /// Returns the number of callbacks run.
    pub fn do_action(
        &self,
        hook: &str,
        registrar: &mut dyn BlockRegistrar,
    ) -> Result<usize, HostError> {
        let handlers = self.get_handlers(hook);
        for handler in handlers {
            (handler.callback)(&mut *registrar)?;
        }
        debug!(hook = %hook, handlers = handlers.len(), "hook fired");
        Ok(handlers.len())
    }

    fn get_handlers(&self, hook: &str) -> &[HookHandler] {
        self.handlers.get(hook).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Check if any callback is queued on a hook.
    pub fn has_hook(&self, hook: &str) -> bool {
        self.handlers
            .get(hook)
            .is_some_and(|handlers| !handlers.is_empty())
    }

    /// Get the count of callbacks for a hook.
    pub fn handler_count(&self, hook: &str) -> usize {
        self.get_handlers(hook).len()
    }

    /// Get all hook names with queued callbacks.
    pub fn hook_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|s| s.as_str())
    }
}

impl ActionRegistrar for HookRegistry {
    fn add_action(&mut self, hook: &str, weight: i32, callback: ActionCallback) {
        let handlers = self.handlers.entry(hook.to_string()).or_default();
        handlers.push(HookHandler { weight, callback });
        // Stable sort keeps registration order among equal weights
        handlers.sort_by_key(|h| h.weight);
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(name, handlers)| (name.as_str(), handlers.len()))
            .collect();
        f.debug_struct("HookRegistry")
            .field("handlers", &counts)
            .finish()
    }
}
