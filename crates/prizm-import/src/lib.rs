//! Import adapters for PrizmAI boards.
//!
//! Raw exports from Trello, Jira, Asana, generic CSV files and PrizmAI's own
//! export format are detected, parsed, validated and transformed into a
//! normalized [`ImportResult`]. Persisting that result is left to the caller.
//!
//! # Usage
//!
//! ```no_run
//! use prizm_import::{AdapterFactory, ImportInput};
//!
//! let raw = std::fs::read("board.json").unwrap();
//! let input = ImportInput::from_bytes(&raw).with_filename("board.json");
//! let result = AdapterFactory::default().import(&input, None);
//! if !result.success {
//!     for error in &result.errors {
//!         eprintln!("{}", error);
//!     }
//! }
//! ```

pub mod adapter;
pub mod adapters;
pub mod csv_table;
pub mod detector;
pub mod error;
pub mod factory;
pub mod field_mapper;
pub mod input;
pub mod normalize;
pub mod user_matcher;

pub use adapter::{Detection, FormatAdapter, ImportAdapter};
pub use adapters::{AsanaAdapter, CsvAdapter, JiraAdapter, NativeAdapter, TrelloAdapter};
pub use csv_table::{CsvRow, CsvTable};
pub use detector::{DetectionCandidate, DetectionResult, FormatDetector};
pub use error::{AdapterResult, ImportError};
pub use factory::AdapterFactory;
pub use field_mapper::{CanonicalField, FieldMapper, FieldMapping};
pub use input::ImportInput;
pub use user_matcher::{InMemoryUserDirectory, UserDirectory, UserMatcher};

pub use prizm_domain::{ImportIssue, ImportResult, ImportSource, ImportStats};
