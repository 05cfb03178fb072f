//! Cached application instance metadata.

use serde::{Deserialize, Serialize};

fn default_app_type() -> String {
    "USER".to_string()
}

/// One running application instance as reported by the application registry.
///
/// Instances sharing `name` are adjacent to each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInstance {
    pub id: String,
    pub name: String,
    /// Node hosting the instance.
    pub node_name: String,
    #[serde(rename = "type", default = "default_app_type")]
    pub app_type: String,
    #[serde(default)]
    pub persist: bool,
}

impl ApplicationInstance {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_name: node_name.into(),
            app_type: default_app_type(),
            persist: false,
        }
    }
}
