//! Engine configuration.

use crate::registry::VIEW_CLASS;

/// Options for a [`Tags`](crate::Tags) context.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct TagsOptions {
    /// Class used for tag names with no registered class. `None` makes
    /// unknown names an error.
    pub default_class: Option<String>,
    /// Prefix for synthesized element ids.
    pub id_prefix: String,
    /// Deepest nesting accepted by the normalizer.
    pub max_depth: u32,
}

impl Default for TagsOptions {
    fn default() -> Self {
        Self {
            default_class: Some(VIEW_CLASS.to_string()),
            id_prefix: "tag-".to_string(),
            max_depth: 256,
        }
    }
}

impl TagsOptions {
    pub fn with_id_prefix(mut self, prefix: &str) -> Self {
        self.id_prefix = prefix.to_string();
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_default_class(mut self, class: Option<&str>) -> Self {
        self.default_class = class.map(str::to_string);
        self
    }
}
