//! Site Counts Kernel
//!
//! Host-side services for block plugins: configuration, the transient
//! store, block manifests and registry, lifecycle hooks, and translation
//! catalogs.

pub mod blocks;
pub mod cache;
pub mod config;
pub mod hooks;
pub mod locale;
pub mod logging;
pub mod state;

pub use config::Config;
pub use state::Kernel;
