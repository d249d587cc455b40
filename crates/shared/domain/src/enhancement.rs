use serde::{Deserialize, Serialize};

/// Read-only snapshot of one registered enhancement, handed to presentation surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementInfo {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub default_enabled: bool,
}
