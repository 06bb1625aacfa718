use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::PrizmResult;

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_MAX_TITLE_LENGTH: usize = 200;
pub const DEFAULT_LABEL_COLOR: &str = "#6c757d";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub import: ImportSettings,
}

/// Tunables shared by every import adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Detections scoring below this are treated as "no match".
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
    #[serde(default = "default_label_color")]
    pub default_label_color: String,
    /// Columns created when a source carries no status information at all.
    #[serde(default = "default_columns")]
    pub default_columns: Vec<String>,
    /// Source header -> canonical field name, consulted before the built-in tables.
    #[serde(default)]
    pub field_overrides: BTreeMap<String, String>,
}

fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}

fn default_max_title_length() -> usize {
    DEFAULT_MAX_TITLE_LENGTH
}

fn default_label_color() -> String {
    DEFAULT_LABEL_COLOR.to_string()
}

fn default_columns() -> Vec<String> {
    vec![
        "To Do".to_string(),
        "In Progress".to_string(),
        "Done".to_string(),
    ]
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_title_length: default_max_title_length(),
            default_label_color: default_label_color(),
            default_columns: default_columns(),
            field_overrides: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/prizm/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("prizm/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("prizm\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Loads the user config, falling back to defaults when it is missing or unreadable.
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                match Self::load_from(&config_path) {
                    Ok(config) => return config,
                    Err(err) => {
                        tracing::warn!(
                            "Ignoring invalid config at {}: {}",
                            config_path.display(),
                            err
                        );
                    }
                }
            }
        }
        Self::default()
    }

    pub fn load_from(path: &Path) -> PrizmResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> PrizmResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> PrizmResult<()> {
        let settings = &self.import;
        if !(0.0..=1.0).contains(&settings.min_confidence) {
            return Err(crate::PrizmError::Validation(format!(
                "import.min_confidence must be between 0 and 1, got {}",
                settings.min_confidence
            )));
        }
        if settings.max_title_length == 0 {
            return Err(crate::PrizmError::Validation(
                "import.max_title_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
