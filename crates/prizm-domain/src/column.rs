use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedColumn {
    pub name: String,
    pub position: i32,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub wip_limit: Option<i32>,
}

impl ImportedColumn {
    pub fn new(name: String, position: i32) -> Self {
        Self {
            name,
            position,
            external_id: None,
            wip_limit: None,
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
