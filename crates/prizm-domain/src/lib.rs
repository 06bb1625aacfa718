pub mod board;
pub mod column;
pub mod comment;
pub mod label;
pub mod priority;
pub mod result;
pub mod source;
pub mod task;
pub mod user;

pub use board::ImportedBoard;
pub use column::ImportedColumn;
pub use comment::ImportedComment;
pub use label::ImportedLabel;
pub use priority::TaskPriority;
pub use result::{ImportIssue, ImportResult, ImportStats};
pub use source::ImportSource;
pub use task::{ChecklistItem, ImportedTask};
pub use user::{ImportedUser, OrganizationId, PlatformUser, UserId};
