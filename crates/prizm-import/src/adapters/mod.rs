//! One adapter per supported source format.

pub mod asana;
pub mod csv;
pub mod jira;
pub mod native;
pub mod trello;

pub use asana::AsanaAdapter;
pub use csv::CsvAdapter;
pub use jira::JiraAdapter;
pub use native::NativeAdapter;
pub use trello::TrelloAdapter;
