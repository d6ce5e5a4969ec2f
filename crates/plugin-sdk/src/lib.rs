//! Site Counts Plugin SDK
//!
//! Types and traits shared between the kernel and block plugins.
//! Plugins depend on this crate to reach host services (transients,
//! content types, item queries, translations) and to build markup.

pub mod block;
pub mod host;
pub mod host_errors;
pub mod i18n;
pub mod render;
pub mod types;

pub use host_errors::HostError;

// Re-export serde_json so plugins agree with the host on the version.
#[doc(hidden)]
pub use serde_json;

pub mod prelude {
    pub use crate::block::*;
    pub use crate::host::*;
    pub use crate::host_errors::HostError;
    pub use crate::i18n::{Catalog, FormatArg, IdentityCatalog, sprintf};
    pub use crate::render;
    pub use crate::types::*;
}
