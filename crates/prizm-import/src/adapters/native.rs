//! PrizmAI's own board export format.
//!
//! ```json
//! {
//!   "prizm_export_version": "1.0",
//!   "board": { "name": "Roadmap", "description": null },
//!   "columns": [ { "name": "To Do", "position": 0 } ],
//!   "tasks": [ { "title": "Plan", "column": "To Do" } ],
//!   "labels": [], "users": [], "comments": []
//! }
//! ```

use prizm_core::ImportSettings;
use prizm_domain::{
    ImportResult, ImportSource, ImportedColumn, ImportedComment, ImportedLabel, ImportedTask,
    ImportedUser,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::{clean_title, row_issue, Detection, ImportAdapter};
use crate::error::{AdapterResult, ImportError};
use crate::input::ImportInput;
use crate::normalize::{self, TODO_COLUMN};

pub const EXPORT_VERSION: &str = "1.0";
pub const VERSION_KEY: &str = "prizm_export_version";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeBoard {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeExport {
    #[serde(rename = "prizm_export_version", default)]
    pub version: Option<String>,
    pub board: NativeBoard,
    #[serde(default)]
    pub columns: Vec<ImportedColumn>,
    #[serde(default)]
    pub tasks: Vec<ImportedTask>,
    #[serde(default)]
    pub labels: Vec<ImportedLabel>,
    #[serde(default)]
    pub users: Vec<ImportedUser>,
    #[serde(default)]
    pub comments: Vec<ImportedComment>,
}

impl NativeExport {
    /// Snapshot of a finished import in the native format.
    pub fn from_result(result: &ImportResult) -> Self {
        Self {
            version: Some(EXPORT_VERSION.to_string()),
            board: NativeBoard {
                name: result.board.name.clone(),
                description: result.board.description.clone(),
            },
            columns: result.columns.clone(),
            tasks: result.tasks.clone(),
            labels: result.labels.clone(),
            users: result.users.clone(),
            comments: result.comments.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NativeAdapter {
    settings: ImportSettings,
}

impl NativeAdapter {
    pub fn new(settings: ImportSettings) -> Self {
        Self { settings }
    }

    /// Serializes a result so it can be re-imported by this adapter.
    pub fn export(result: &ImportResult) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&NativeExport::from_result(result))
    }

    fn major_version(version: &str) -> Option<u32> {
        version.trim().split('.').next()?.parse().ok()
    }

    /// Pulls a hand-edited task back inside the data model's ranges.
    fn check_ranges(&self, task: &mut ImportedTask, row: usize, result: &mut ImportResult) {
        if task.column.trim().is_empty() {
            let fallback = result
                .columns
                .first()
                .map(|column| column.name.clone())
                .or_else(|| self.settings.default_columns.first().cloned())
                .unwrap_or_else(|| TODO_COLUMN.to_string());
            result.warn(
                row_issue(format!("Task has no column; placed in '{}'", fallback), Some(row))
                    .with_field("column"),
            );
            task.column = fallback;
        }
        if task.progress > 100 {
            result.warn(
                row_issue(format!("Progress {} capped at 100", task.progress), Some(row))
                    .with_field("progress"),
            );
            task.progress = 100;
        }
        if let Some(complexity) = task.complexity.filter(|c| !(1..=10).contains(c)) {
            result.warn(
                row_issue(format!("Ignoring complexity {} outside 1-10", complexity), Some(row))
                    .with_field("complexity"),
            );
            task.complexity = None;
        }
    }
}

impl ImportAdapter for NativeAdapter {
    type Document = NativeExport;

    fn source(&self) -> ImportSource {
        ImportSource::Native
    }

    fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn detect(&self, input: &ImportInput<'_>) -> Detection {
        let Some(json) = input.json() else {
            return Detection::no();
        };
        if json.get(VERSION_KEY).is_some() {
            Detection::yes(0.99)
        } else if json.get("board").map(Value::is_object).unwrap_or(false)
            && json.get("columns").map(Value::is_array).unwrap_or(false)
            && json.get("tasks").map(Value::is_array).unwrap_or(false)
        {
            Detection::yes(0.7)
        } else {
            Detection::no()
        }
    }

    fn parse(&self, input: &ImportInput<'_>) -> AdapterResult<Self::Document> {
        let value: Value = serde_json::from_str(input.text())?;
        if value.get("board").is_none() {
            return Err(ImportError::missing_field("board"));
        }
        Ok(serde_json::from_value(value)?)
    }

    fn validate(&self, document: &Self::Document, result: &mut ImportResult) -> AdapterResult<()> {
        match document.version.as_deref() {
            Some(version) => match Self::major_version(version) {
                Some(1) => {}
                _ => {
                    return Err(ImportError::UnsupportedFormat(format!(
                        "PrizmAI export version {}",
                        version
                    )))
                }
            },
            None => result.warn(format!(
                "No {} key; assuming version {}",
                VERSION_KEY, EXPORT_VERSION
            )),
        }
        if document.board.name.trim().is_empty() {
            return Err(ImportError::missing_field("board.name"));
        }
        Ok(())
    }

    fn transform(
        &self,
        document: Self::Document,
        _input: &ImportInput<'_>,
        result: &mut ImportResult,
    ) -> AdapterResult<()> {
        result.board.rename(&document.board.name);
        result.board.set_description(document.board.description.as_deref());

        let mut columns = document.columns;
        columns.sort_by_key(|column| column.position);
        for column in columns {
            if column.name.trim().is_empty() {
                result.warn("Skipped a column without a name");
                continue;
            }
            if result.column(&column.name).is_none() {
                result.columns.push(column);
            }
        }

        for label in document.labels {
            let color = normalize::parse_color(&label.color, &self.settings.default_label_color);
            result.ensure_label(&label.name, &color);
        }
        for user in document.users {
            result.ensure_user(user);
        }

        let mut tasks = document.tasks;
        tasks.sort_by_key(|task| task.position);
        for (index, mut task) in tasks.into_iter().enumerate() {
            let Some(title) = clean_title(Some(&task.title), &self.settings, result, Some(index + 1))
            else {
                result.skip_row(row_issue("Skipped task without a title", Some(index + 1)));
                continue;
            };
            task.title = title;
            task.assignee_user_id = None;
            self.check_ranges(&mut task, index + 1, result);
            result.push_task(task);
        }

        for comment in document.comments {
            if comment.text.trim().is_empty() {
                continue;
            }
            result.comments.push(comment);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_version() {
        assert_eq!(NativeAdapter::major_version("1.0"), Some(1));
        assert_eq!(NativeAdapter::major_version("2"), Some(2));
        assert_eq!(NativeAdapter::major_version("beta"), None);
    }

    #[test]
    fn test_rejects_future_version() {
        let json = r#"{"prizm_export_version":"2.0","board":{"name":"B"}}"#;
        let result = NativeAdapter::default().run(&ImportInput::new(json));
        assert!(!result.success);
        assert!(result.errors[0].message.contains("2.0"));
    }

    #[test]
    fn test_out_of_range_task_fields_are_corrected() {
        let json = r#"{
            "prizm_export_version": "1.0",
            "board": {"name": "Roadmap"},
            "columns": [{"name": "Backlog", "position": 0}],
            "tasks": [
                {"title": "T", "column": "  ", "progress": 250, "complexity": 42},
                {"title": "U", "column": "Backlog", "complexity": 0}
            ]
        }"#;
        let result = NativeAdapter::default().run(&ImportInput::new(json));
        assert!(result.success);
        assert_eq!(result.columns.len(), 1);
        assert_eq!(result.tasks[0].column, "Backlog");
        assert_eq!(result.tasks[0].progress, 100);
        assert_eq!(result.tasks[0].complexity, None);
        assert_eq!(result.tasks[1].complexity, None);
        for field in ["column", "progress", "complexity"] {
            assert!(result.warnings.iter().any(|w| w.field.as_deref() == Some(field)));
        }
    }

    #[test]
    fn test_blank_column_without_columns_uses_default() {
        let json = r#"{"board": {"name": "B"}, "columns": [], "tasks": [{"title": "T", "column": ""}]}"#;
        let result = NativeAdapter::default().run(&ImportInput::new(json));
        assert!(result.success);
        assert_eq!(result.columns.len(), 1);
        assert!(!result.columns[0].name.is_empty());
        assert_eq!(result.tasks[0].column, result.columns[0].name);
    }

    #[test]
    fn test_comments_for_missing_tasks_are_dropped() {
        let json = r#"{
            "prizm_export_version": "1.0",
            "board": {"name": "B"},
            "tasks": [{"external_id": "T-1", "title": "Kept", "column": "To Do"}],
            "comments": [
                {"task_external_id": "T-1", "text": "ok"},
                {"task_external_id": "T-404", "text": "lost"}
            ]
        }"#;
        let result = NativeAdapter::default().run(&ImportInput::new(json));
        assert!(result.success);
        assert_eq!(result.comments.len(), 1);
        assert_eq!(result.stats.comments, 1);
    }

    #[test]
    fn test_export_then_reimport_keeps_board() {
        let json = r#"{
            "prizm_export_version": "1.0",
            "board": {"name": "Roadmap"},
            "columns": [{"name": "Done", "position": 1}, {"name": "To Do", "position": 0}],
            "tasks": [{"title": "Plan", "column": "to do", "labels": ["Ops"]}]
        }"#;
        let adapter = NativeAdapter::default();
        let first = adapter.run(&ImportInput::new(json));
        assert!(first.success);
        assert_eq!(first.columns[0].name, "To Do");
        assert_eq!(first.tasks[0].column, "To Do");

        let exported = NativeAdapter::export(&first).unwrap();
        let second = adapter.run(&ImportInput::new(&exported));
        assert!(second.success);
        assert_eq!(second.board.name, "Roadmap");
        assert_eq!(second.stats, first.stats);
    }
}
