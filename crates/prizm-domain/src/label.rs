use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedLabel {
    pub name: String,
    pub color: String,
}

impl ImportedLabel {
    pub fn new(name: String, color: String) -> Self {
        Self { name, color }
    }
}
