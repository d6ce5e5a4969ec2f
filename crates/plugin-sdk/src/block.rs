//! Block types and the registration/render contracts.
//!
//! A block plugin implements [`BlockRenderer`] and binds it through a
//! [`BlockRegistrar`], usually from a callback queued on the `init`
//! lifecycle hook via [`ActionRegistrar`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::HostError;

/// Lifecycle hook fired once while the host boots.
pub const HOOK_INIT: &str = "init";

/// Attribute key carrying the editor-assigned CSS class.
pub const ATTR_CLASS_NAME: &str = "className";

/// Attributes a block instance was configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockAttributes(Map<String, Value>);

impl BlockAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any existing value.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set an attribute only if it is not present yet.
    pub fn set_default(&mut self, key: &str, value: Value) {
        self.0.entry(key.to_string()).or_insert(value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A string attribute, or `None` if absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The `className` attribute; empty when unset.
    pub fn class_name(&self) -> &str {
        self.get_str(ATTR_CLASS_NAME).unwrap_or("")
    }
}

impl From<Map<String, Value>> for BlockAttributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Ambient state of the page being rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// ID of the item currently being displayed, if any.
    pub current_item_id: Option<u64>,
}

impl RenderContext {
    pub fn for_item(id: u64) -> Self {
        Self {
            current_item_id: Some(id),
        }
    }
}

/// Declared type of a block attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

/// One attribute declared by a block manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    #[serde(default)]
    pub default: Option<Value>,
}

/// Block metadata, loaded from the plugin's manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMetadata {
    /// Namespaced block name, e.g. `xwp/site-counts`.
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Translation domain for the block's strings.
    #[serde(default)]
    pub text_domain: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeDefinition>,
}

fn default_category() -> String {
    "widgets".to_string()
}

/// Server-side render callback for a block.
pub trait BlockRenderer: Send + Sync {
    /// Produce the block's HTML.
    fn render(
        &self,
        attributes: &BlockAttributes,
        context: &RenderContext,
    ) -> Result<String, HostError>;
}

/// Host-side block registration.
pub trait BlockRegistrar {
    /// Load the manifest found in `dir` and bind `renderer` to it.
    ///
    /// Registering a name that already exists replaces it.
    fn register_block_from_metadata(
        &mut self,
        dir: &Path,
        renderer: Arc<dyn BlockRenderer>,
    ) -> Result<(), HostError>;
}

/// Callback queued on a lifecycle hook.
pub type ActionCallback =
    Box<dyn Fn(&mut dyn BlockRegistrar) -> Result<(), HostError> + Send + Sync>;

/// Host-side lifecycle hook registration.
pub trait ActionRegistrar {
    /// Queue `callback` on `hook`. Lower weights run first.
    fn add_action(&mut self, hook: &str, weight: i32, callback: ActionCallback);
}
