//! Asset records read from the asset store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetProperties {
    pub guid: String,
    pub type_name: String,
    pub qualified_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub additional_properties: BTreeMap<String, String>,
}

impl AssetProperties {
    pub fn new(guid: &str, type_name: &str, qualified_name: &str) -> Self {
        Self {
            guid: guid.to_string(),
            type_name: type_name.to_string(),
            qualified_name: qualified_name.to_string(),
            display_name: None,
            description: None,
            additional_properties: BTreeMap::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }
}
