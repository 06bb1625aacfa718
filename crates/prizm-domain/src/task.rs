use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::priority::TaskPriority;
use crate::user::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedTask {
    #[serde(default)]
    pub external_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Name of the column the task belongs to.
    pub column: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Key of the assignee in [`crate::ImportResult::users`].
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub complexity: Option<u8>,
    #[serde(default)]
    pub story_points: Option<f64>,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub parent_external_id: Option<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub assignee_user_id: Option<UserId>,
}

impl ImportedTask {
    pub fn new(title: String, column: String) -> Self {
        Self {
            external_id: None,
            title,
            description: None,
            column,
            position: 0,
            priority: TaskPriority::default(),
            labels: Vec::new(),
            assignee: None,
            reporter: None,
            due_date: None,
            start_date: None,
            created_at: None,
            completed: false,
            progress: 0,
            complexity: None,
            story_points: None,
            task_type: None,
            parent_external_id: None,
            checklist: Vec::new(),
            assignee_user_id: None,
        }
    }

    pub fn add_label(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if !self.labels.iter().any(|l| l.eq_ignore_ascii_case(name)) {
            self.labels.push(name.to_string());
        }
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
        self.progress = 100;
    }

    /// Derives progress from the checklist, unless the task is already done.
    pub fn progress_from_checklist(&mut self) {
        if self.completed || self.checklist.is_empty() {
            return;
        }
        let done = self.checklist.iter().filter(|item| item.done).count();
        self.progress = ((done * 100) / self.checklist.len()) as u8;
    }
}
