use std::path::Path;

use anyhow::Context;
use prizm_core::{AppConfig, ImportSettings};
use prizm_import::AdapterFactory;

/// Settings resolved for one CLI invocation.
pub struct CliContext {
    pub config: AppConfig,
}

impl CliContext {
    /// An explicit config path must load; the default location falls back to defaults.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load_from(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AppConfig::load(),
        };
        Ok(Self { config })
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.config.import
    }

    pub fn factory(&self) -> AdapterFactory {
        AdapterFactory::new(self.config.import.clone())
    }
}

/// Reads an input file, failing with the path in the message.
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read file {}", path.display()))
}
