//! Asana project exports, either JSON (`{"data": [task, ...]}`) or CSV.

use prizm_core::ImportSettings;
use prizm_domain::{ImportIssue, ImportResult, ImportSource, ImportedTask, ImportedUser};
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::{clean_title, non_blank, row_issue, Detection, ImportAdapter};
use crate::csv_table::CsvTable;
use crate::error::{AdapterResult, ImportError};
use crate::input::ImportInput;
use crate::normalize::{self, DONE_COLUMN, TODO_COLUMN};

/// Section names Asana uses for tasks outside any real section.
const UNSECTIONED: &[&str] = &["untitled section", "(no section)", "no section", ""];

#[derive(Debug)]
pub enum AsanaDocument {
    Csv(CsvTable),
    Json(AsanaExport),
}

#[derive(Debug, Deserialize)]
pub struct AsanaExport {
    #[serde(default)]
    pub data: Vec<AsanaTask>,
}

#[derive(Debug, Deserialize)]
pub struct AsanaTask {
    #[serde(default)]
    pub gid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub due_on: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub start_on: Option<String>,
    #[serde(default)]
    pub assignee: Option<AsanaUser>,
    #[serde(default)]
    pub memberships: Vec<AsanaMembership>,
    #[serde(default)]
    pub tags: Vec<AsanaTag>,
    #[serde(default)]
    pub parent: Option<AsanaRef>,
    #[serde(default)]
    pub custom_fields: Vec<AsanaCustomField>,
    #[serde(default)]
    pub resource_subtype: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AsanaUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AsanaMembership {
    #[serde(default)]
    pub section: Option<AsanaRef>,
    #[serde(default)]
    pub project: Option<AsanaRef>,
}

#[derive(Debug, Deserialize)]
pub struct AsanaRef {
    #[serde(default)]
    pub gid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AsanaTag {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AsanaCustomField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default)]
    pub number_value: Option<f64>,
}

impl AsanaTask {
    fn custom_field(&self, name: &str) -> Option<&AsanaCustomField> {
        self.custom_fields.iter().find(|field| {
            field
                .name
                .as_deref()
                .map(|n| n.trim().eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
    }

    fn section(&self) -> Option<&str> {
        self.memberships
            .iter()
            .find_map(|m| m.section.as_ref().and_then(|s| s.name.as_deref()))
    }

    fn project(&self) -> Option<&str> {
        self.memberships
            .iter()
            .find_map(|m| m.project.as_ref().and_then(|p| p.name.as_deref()))
    }
}

/// Fields shared by both export shapes.
#[derive(Debug, Default)]
struct AsanaRecord {
    row: Option<usize>,
    id: Option<String>,
    name: Option<String>,
    notes: Option<String>,
    section: Option<String>,
    completed: bool,
    created: Option<String>,
    due: Option<String>,
    start: Option<String>,
    assignee: Option<ImportedUser>,
    tags: Vec<(String, Option<String>)>,
    parent: Option<String>,
    priority: Option<String>,
    estimate: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AsanaAdapter {
    settings: ImportSettings,
}

impl AsanaAdapter {
    pub fn new(settings: ImportSettings) -> Self {
        Self { settings }
    }

    fn section_column(section: Option<&str>) -> String {
        match section.map(str::trim) {
            Some(name) if !UNSECTIONED.contains(&name.to_lowercase().as_str()) => {
                name.trim_end_matches(':').to_string()
            }
            _ => TODO_COLUMN.to_string(),
        }
    }

    fn json_record(task: &AsanaTask) -> AsanaRecord {
        let priority = task
            .custom_field("Priority")
            .and_then(|field| non_blank(field.display_value.as_deref()));
        let estimate = ["Estimate", "Story Points", "Points"]
            .iter()
            .find_map(|name| task.custom_field(name))
            .and_then(|field| {
                field.number_value.or_else(|| {
                    field
                        .display_value
                        .as_deref()
                        .and_then(normalize::parse_number)
                })
            });

        AsanaRecord {
            row: None,
            id: non_blank(task.gid.as_deref()),
            name: non_blank(task.name.as_deref()),
            notes: non_blank(task.notes.as_deref()),
            section: non_blank(task.section()),
            completed: task.completed || task.completed_at.is_some(),
            created: task.created_at.clone(),
            due: task.due_at.clone().or_else(|| task.due_on.clone()),
            start: task.start_on.clone(),
            assignee: task.assignee.as_ref().and_then(|user| {
                ImportedUser::from_parts(None, user.email.as_deref(), user.name.as_deref())
            }),
            tags: task
                .tags
                .iter()
                .filter_map(|tag| non_blank(tag.name.as_deref()).map(|n| (n, tag.color.clone())))
                .collect(),
            parent: task.parent.as_ref().and_then(|p| non_blank(p.gid.as_deref())),
            priority,
            estimate,
        }
    }

    fn csv_records(table: &CsvTable) -> Vec<AsanaRecord> {
        let id = table.header_index("Task ID");
        let name = table.header_index("Name");
        let notes = table.header_index("Notes");
        let section = table.find_header(&["Section/Column", "Section"]);
        let completed = table.header_index("Completed At");
        let created = table.header_index("Created At");
        let due = table.header_index("Due Date");
        let start = table.header_index("Start Date");
        let assignee = table.header_index("Assignee");
        let assignee_email = table.header_index("Assignee Email");
        let tags = table.header_index("Tags");
        let parent = table.header_index("Parent task");
        let priority = table.header_index("Priority");
        let estimate = table.find_header(&["Estimate", "Story Points", "Points"]);

        table
            .rows
            .iter()
            .map(|row| AsanaRecord {
                row: Some(row.line),
                id: non_blank(row.get_opt(id)),
                name: non_blank(row.get_opt(name)),
                notes: non_blank(row.get_opt(notes)),
                section: non_blank(row.get_opt(section)),
                completed: row.get_opt(completed).is_some(),
                created: non_blank(row.get_opt(created)),
                due: non_blank(row.get_opt(due)),
                start: non_blank(row.get_opt(start)),
                assignee: ImportedUser::from_parts(
                    None,
                    row.get_opt(assignee_email),
                    row.get_opt(assignee),
                ),
                tags: row
                    .get_opt(tags)
                    .map(normalize::split_list)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|tag| (tag, None))
                    .collect(),
                parent: non_blank(row.get_opt(parent)),
                priority: non_blank(row.get_opt(priority)),
                estimate: row.get_opt(estimate).and_then(normalize::parse_number),
            })
            .collect()
    }

    fn build_task(&self, record: AsanaRecord, result: &mut ImportResult) -> Option<ImportedTask> {
        let row = record.row;
        let Some(title) = clean_title(record.name.as_deref(), &self.settings, result, row) else {
            result.skip_row(row_issue("Skipped task without a name", row));
            return None;
        };

        let column = if record.completed {
            DONE_COLUMN.to_string()
        } else {
            Self::section_column(record.section.as_deref())
        };

        let mut task = ImportedTask::new(title, column);
        task.external_id = record.id;
        task.description = record.notes;
        task.parent_external_id = record.parent;
        task.created_at = record.created.as_deref().and_then(normalize::parse_date);
        task.start_date = record.start.as_deref().and_then(normalize::parse_date);
        if let Some(due) = record.due.as_deref() {
            task.due_date = normalize::parse_date(due);
            if task.due_date.is_none() {
                result.warn(
                    row_issue(format!("Unrecognized due date '{}'", due), row)
                        .with_field("Due Date"),
                );
            }
        }

        let default_color = self.settings.default_label_color.as_str();
        for (tag, color) in &record.tags {
            let color = normalize::parse_color(color.as_deref().unwrap_or(""), default_color);
            let canonical = result.ensure_label(tag, &color);
            task.add_label(&canonical);
        }

        if let Some(priority) = record.priority.as_deref() {
            match normalize::parse_priority(priority) {
                Some(parsed) => task.priority = parsed,
                None => result.warn(
                    row_issue(format!("Unknown priority '{}', using medium", priority), row)
                        .with_field("Priority"),
                ),
            }
        }

        if let Some(points) = record.estimate {
            task.story_points = Some(points);
            task.complexity = normalize::points_to_complexity(points);
        }

        task.assignee = record.assignee.map(|user| result.ensure_user(user));
        if record.completed {
            task.mark_completed();
        }
        Some(task)
    }
}

impl ImportAdapter for AsanaAdapter {
    type Document = AsanaDocument;

    fn source(&self) -> ImportSource {
        ImportSource::Asana
    }

    fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn detect(&self, input: &ImportInput<'_>) -> Detection {
        if let Some(json) = input.json() {
            let Some(first) = json
                .get("data")
                .and_then(Value::as_array)
                .and_then(|tasks| tasks.first())
            else {
                return Detection::no();
            };
            return match (first.get("gid").is_some(), first.get("memberships").is_some()) {
                (true, true) => Detection::yes(0.97),
                (true, false) => Detection::yes(0.9),
                _ => Detection::no(),
            };
        }

        let Some(table) = input.csv() else {
            return Detection::no();
        };
        if table.has_header("Section/Column") {
            Detection::yes(0.97)
        } else if table.has_header("Task ID")
            && table.has_header("Name")
            && (table.has_header("Assignee Email") || table.has_header("Projects"))
        {
            Detection::yes(0.85)
        } else if table.has_header("Name") && input.filename_contains("asana") {
            Detection::yes(0.6)
        } else {
            Detection::no()
        }
    }

    fn parse(&self, input: &ImportInput<'_>) -> AdapterResult<Self::Document> {
        if input.looks_like_json() {
            let value: Value = serde_json::from_str(input.text())?;
            if !value.get("data").map(Value::is_array).unwrap_or(false) {
                return Err(ImportError::missing_field("data"));
            }
            return Ok(AsanaDocument::Json(serde_json::from_value(value)?));
        }
        Ok(AsanaDocument::Csv(CsvTable::parse(input.text())?))
    }

    fn validate(&self, document: &Self::Document, result: &mut ImportResult) -> AdapterResult<()> {
        match document {
            AsanaDocument::Csv(table) => {
                if !table.has_header("Name") {
                    return Err(ImportError::missing_field("Name"));
                }
                if table
                    .find_header(&["Section/Column", "Section"])
                    .is_none()
                {
                    result.warn(
                        ImportIssue::new("No section column; open tasks go to 'To Do'")
                            .with_field("Section/Column"),
                    );
                }
            }
            AsanaDocument::Json(export) => {
                let subtasks = export.data.iter().filter(|t| t.parent.is_some()).count();
                if subtasks > 0 {
                    result.warn(format!(
                        "{} subtasks imported as top-level tasks with a parent reference",
                        subtasks
                    ));
                }
            }
        }
        Ok(())
    }

    fn transform(
        &self,
        document: Self::Document,
        input: &ImportInput<'_>,
        result: &mut ImportResult,
    ) -> AdapterResult<()> {
        let records = match &document {
            AsanaDocument::Csv(table) => {
                let project = table
                    .header_index("Projects")
                    .and_then(|i| table.first_value(i))
                    .map(|projects| projects.split(',').next().unwrap_or(projects).trim());
                if let Some(name) = project.or(input.file_stem()) {
                    result.board.rename(name);
                }
                Self::csv_records(table)
            }
            AsanaDocument::Json(export) => {
                if let Some(name) = export
                    .data
                    .iter()
                    .find_map(AsanaTask::project)
                    .or(input.file_stem())
                {
                    result.board.rename(name);
                }
                export
                    .data
                    .iter()
                    .filter(|task| task.resource_subtype.as_deref() != Some("section"))
                    .map(Self::json_record)
                    .collect()
            }
        };

        let mut completed_tasks = Vec::new();
        for record in records {
            let Some(task) = self.build_task(record, result) else {
                continue;
            };
            if task.completed {
                completed_tasks.push(task);
            } else {
                result.ensure_column(&task.column);
                result.push_task(task);
            }
        }

        // Done goes last, after every section seen on open tasks.
        if !completed_tasks.is_empty() {
            result.ensure_column(DONE_COLUMN);
        }
        for task in completed_tasks {
            result.push_task(task);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_column() {
        assert_eq!(AsanaAdapter::section_column(Some("Untitled section")), TODO_COLUMN);
        assert_eq!(AsanaAdapter::section_column(None), TODO_COLUMN);
        assert_eq!(AsanaAdapter::section_column(Some("Backlog:")), "Backlog");
        assert_eq!(AsanaAdapter::section_column(Some(" Design ")), "Design");
    }

    #[test]
    fn test_detect_csv_section_header() {
        let adapter = AsanaAdapter::default();
        let input = ImportInput::new("Task ID,Name,Section/Column\n1,A,Todo\n");
        assert!(adapter.detect(&input).confidence >= 0.95);
        assert!(!adapter.detect(&ImportInput::new("Title\nA\n")).can_handle);
    }
}
