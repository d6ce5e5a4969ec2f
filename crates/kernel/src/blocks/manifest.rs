//! Parser for block `block.toml` manifest files.
//!
//! Each block plugin directory carries a `block.toml` that declares:
//! - name (`namespace/slug`), title, description, category
//! - text domain for translations
//! - attributes with their types and optional defaults

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use site_counts_sdk::block::{AttributeType, BlockMetadata};

/// Manifest file name looked up in a block directory.
pub const MANIFEST_FILE: &str = "block.toml";

/// Load and validate the manifest in `dir`.
pub fn load_manifest(dir: &Path) -> Result<BlockMetadata> {
    parse(&dir.join(MANIFEST_FILE))
}

/// Parse a manifest file from the given path.
pub fn parse(path: &Path) -> Result<BlockMetadata> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read block manifest: {}", path.display()))?;

    parse_str(&content, path)
}

/// Parse a manifest from a TOML string.
pub fn parse_str(content: &str, path: &Path) -> Result<BlockMetadata> {
    let metadata: BlockMetadata = toml::from_str(content)
        .with_context(|| format!("failed to parse block manifest TOML at {}", path.display()))?;

    validate(&metadata, path)?;
    Ok(metadata)
}

fn validate(metadata: &BlockMetadata, path: &Path) -> Result<()> {
    if !is_valid_block_name(&metadata.name) {
        anyhow::bail!(
            "block manifest at {} has invalid name '{}': expected 'namespace/slug' \
             using lowercase letters, digits and hyphens",
            path.display(),
            metadata.name
        );
    }

    if metadata.title.trim().is_empty() {
        anyhow::bail!(
            "block '{}' at {} has empty 'title' field",
            metadata.name,
            path.display()
        );
    }

    for (attr, definition) in &metadata.attributes {
        if let Some(default) = &definition.default {
            if !default_matches(definition.attr_type, default) {
                anyhow::bail!(
                    "block '{}' attribute '{}' has a default that is not of type {:?}",
                    metadata.name,
                    attr,
                    definition.attr_type
                );
            }
        }
    }

    Ok(())
}

/// `namespace/slug`, both parts non-empty, `[a-z0-9-]`, starting with a letter.
fn is_valid_block_name(name: &str) -> bool {
    let Some((namespace, slug)) = name.split_once('/') else {
        return false;
    };
    [namespace, slug].iter().all(|part| {
        part.starts_with(|c: char| c.is_ascii_lowercase())
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    })
}

fn default_matches(attr_type: AttributeType, value: &Value) -> bool {
    match attr_type {
        AttributeType::String => value.is_string(),
        AttributeType::Number => value.is_number(),
        AttributeType::Integer => value.is_i64() || value.is_u64(),
        AttributeType::Boolean => value.is_boolean(),
        AttributeType::Object => value.is_object(),
        AttributeType::Array => value.is_array(),
    }
}
