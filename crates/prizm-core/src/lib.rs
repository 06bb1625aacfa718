pub mod config;
pub mod error;
pub mod result;

pub use config::{AppConfig, ImportSettings};
pub use error::PrizmError;
pub use result::PrizmResult;
