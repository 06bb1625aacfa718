use serde::{Deserialize, Serialize};

use crate::source::ImportSource;

pub const DEFAULT_BOARD_NAME: &str = "Imported Board";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedBoard {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub source: ImportSource,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl ImportedBoard {
    pub fn new(source: ImportSource) -> Self {
        Self {
            name: DEFAULT_BOARD_NAME.to_string(),
            description: None,
            source,
            external_id: None,
        }
    }

    /// Replaces the name unless the candidate is blank.
    pub fn rename(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.name = name.to_string();
        }
    }

    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
    }
}
