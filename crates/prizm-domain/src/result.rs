//! The normalized outcome of one import.
//!
//! Adapters fill an [`ImportResult`] incrementally and call
//! [`ImportResult::finalize`] once; the caller then persists it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::{
    ImportSource, ImportedBoard, ImportedColumn, ImportedComment, ImportedLabel, ImportedTask,
    ImportedUser,
};

/// A warning or error, optionally pinned to a field and a source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportIssue {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl ImportIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            row: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

impl fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(row) = self.row {
            write!(f, "row {}: ", row)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl From<&str> for ImportIssue {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ImportIssue {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub columns: usize,
    pub tasks: usize,
    pub labels: usize,
    pub users: usize,
    pub comments: usize,
    pub completed_tasks: usize,
    pub rows_skipped: usize,
    pub users_matched: usize,
    pub users_unmatched: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub source: ImportSource,
    pub board: ImportedBoard,
    pub columns: Vec<ImportedColumn>,
    pub tasks: Vec<ImportedTask>,
    pub labels: Vec<ImportedLabel>,
    pub users: Vec<ImportedUser>,
    pub comments: Vec<ImportedComment>,
    pub stats: ImportStats,
    pub warnings: Vec<ImportIssue>,
    pub errors: Vec<ImportIssue>,
}

impl ImportResult {
    pub fn new(source: ImportSource) -> Self {
        Self {
            success: false,
            source,
            board: ImportedBoard::new(source),
            columns: Vec::new(),
            tasks: Vec::new(),
            labels: Vec::new(),
            users: Vec::new(),
            comments: Vec::new(),
            stats: ImportStats::default(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// A result that carries nothing but the given error.
    pub fn failed(source: ImportSource, issue: impl Into<ImportIssue>) -> Self {
        let mut result = Self::new(source);
        result.error(issue);
        result
    }

    pub fn warn(&mut self, issue: impl Into<ImportIssue>) {
        self.warnings.push(issue.into());
    }

    pub fn error(&mut self, issue: impl Into<ImportIssue>) {
        self.errors.push(issue.into());
        self.success = false;
    }

    /// Records a source row that produced no task.
    pub fn skip_row(&mut self, issue: impl Into<ImportIssue>) {
        self.stats.rows_skipped += 1;
        self.warn(issue);
    }

    pub fn column(&self, name: &str) -> Option<&ImportedColumn> {
        self.columns.iter().find(|c| c.matches_name(name))
    }

    /// Returns the canonical name of the column called `name`, appending it
    /// when no column matches case-insensitively.
    pub fn ensure_column(&mut self, name: &str) -> String {
        if let Some(existing) = self.column(name) {
            return existing.name.clone();
        }
        let name = name.trim().to_string();
        let position = self.columns.len() as i32;
        self.columns.push(ImportedColumn::new(name.clone(), position));
        name
    }

    pub fn label(&self, name: &str) -> Option<&ImportedLabel> {
        self.labels
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Returns the canonical label name, registering the label on first sight.
    pub fn ensure_label(&mut self, name: &str, color: &str) -> String {
        if let Some(existing) = self.label(name) {
            return existing.name.clone();
        }
        let name = name.trim().to_string();
        self.labels
            .push(ImportedLabel::new(name.clone(), color.to_string()));
        name
    }

    /// Registers a user, merging identifiers into an existing record with the same key.
    pub fn ensure_user(&mut self, user: ImportedUser) -> String {
        let key = user.key.clone();
        match self.users.iter_mut().find(|u| u.key == key) {
            Some(existing) => existing.merge(user),
            None => self.users.push(user),
        }
        key
    }

    pub fn user(&self, key: &str) -> Option<&ImportedUser> {
        self.users.iter().find(|u| u.key == key)
    }

    pub fn push_task(&mut self, task: ImportedTask) {
        self.tasks.push(task);
    }

    pub fn tasks_in_column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ImportedTask> {
        self.tasks
            .iter()
            .filter(move |t| t.column.eq_ignore_ascii_case(name))
    }

    /// Restores the invariants callers rely on:
    /// every task references an existing column and label, columns and
    /// per-column task positions are dense, and stats mirror the collections.
    pub fn finalize(&mut self, default_label_color: &str) {
        for task in self.tasks.iter_mut() {
            let canonical = match self.columns.iter().find(|c| c.matches_name(&task.column)) {
                Some(existing) => existing.name.clone(),
                None => {
                    let name = task.column.trim().to_string();
                    let position = self.columns.len() as i32;
                    self.columns.push(ImportedColumn::new(name.clone(), position));
                    name
                }
            };
            task.column = canonical;
        }

        for (index, column) in self.columns.iter_mut().enumerate() {
            column.position = index as i32;
        }

        let mut next_position: HashMap<String, i32> = HashMap::new();
        for task in self.tasks.iter_mut() {
            let slot = next_position.entry(task.column.to_lowercase()).or_insert(0);
            task.position = *slot;
            *slot += 1;

            let mut canonical_labels = Vec::with_capacity(task.labels.len());
            for label in std::mem::take(&mut task.labels) {
                let name = match self
                    .labels
                    .iter()
                    .find(|l| l.name.eq_ignore_ascii_case(label.trim()))
                {
                    Some(existing) => existing.name.clone(),
                    None => {
                        let name = label.trim().to_string();
                        self.labels.push(ImportedLabel::new(
                            name.clone(),
                            default_label_color.to_string(),
                        ));
                        name
                    }
                };
                if !canonical_labels.contains(&name) {
                    canonical_labels.push(name);
                }
            }
            task.labels = canonical_labels;
        }

        let task_ids: HashSet<&str> = self
            .tasks
            .iter()
            .filter_map(|t| t.external_id.as_deref())
            .collect();
        let before = self.comments.len();
        self.comments
            .retain(|c| task_ids.contains(c.task_external_id.as_str()));
        let orphaned = before - self.comments.len();
        if orphaned > 0 {
            self.warn(format!(
                "Dropped {} comment(s) that belong to no imported task",
                orphaned
            ));
        }

        self.stats.columns = self.columns.len();
        self.stats.tasks = self.tasks.len();
        self.stats.labels = self.labels.len();
        self.stats.users = self.users.len();
        self.stats.comments = self.comments.len();
        self.stats.completed_tasks = self.tasks.iter().filter(|t| t.completed).count();
        self.success = self.errors.is_empty();
    }
}
