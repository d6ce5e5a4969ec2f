//! Block manifests and the block registry.

pub mod manifest;
pub mod registry;

pub use registry::{BlockRegistry, RegisteredBlock};
