use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrizmError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PrizmError {
    fn from(err: serde_json::Error) -> Self {
        PrizmError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PrizmError {
    fn from(err: toml::de::Error) -> Self {
        PrizmError::Config(err.to_string())
    }
}
