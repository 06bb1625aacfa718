use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedComment {
    pub task_external_id: String,
    /// Key of the [`crate::ImportedUser`] who wrote it, when known.
    #[serde(default)]
    pub author: Option<String>,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
