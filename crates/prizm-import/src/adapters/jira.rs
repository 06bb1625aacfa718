//! Jira issue exports: the "Export CSV (all fields)" file or a REST search
//! response (`{"issues": [{"key", "fields": {...}}]}`).

use std::collections::HashSet;

use prizm_core::ImportSettings;
use prizm_domain::{
    ImportIssue, ImportResult, ImportSource, ImportedComment, ImportedTask, ImportedUser,
};
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::{clean_title, non_blank, row_issue, Detection, ImportAdapter};
use crate::csv_table::{CsvRow, CsvTable};
use crate::error::{AdapterResult, ImportError};
use crate::input::ImportInput;
use crate::normalize;

const STORY_POINT_HEADERS: &[&str] = &[
    "Custom field (Story Points)",
    "Custom field (Story point estimate)",
    "Story Points",
    "Story point estimate",
];
const STORY_POINT_FIELDS: &[&str] = &[
    "customfield_10016",
    "customfield_10026",
    "customfield_10002",
    "story_points",
];

#[derive(Debug)]
pub enum JiraDocument {
    Csv(CsvTable),
    Json(JiraSearch),
}

#[derive(Debug, Deserialize)]
pub struct JiraSearch {
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

#[derive(Debug, Deserialize)]
pub struct JiraIssue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fields: JiraFields,
}

#[derive(Debug, Default, Deserialize)]
pub struct JiraFields {
    #[serde(default)]
    pub summary: Option<String>,
    /// Plain text on Server, an Atlassian Document Format tree on Cloud.
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub status: Option<JiraNamed>,
    #[serde(default)]
    pub priority: Option<JiraNamed>,
    #[serde(default)]
    pub issuetype: Option<JiraNamed>,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    #[serde(default)]
    pub reporter: Option<JiraUser>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub duedate: Option<String>,
    #[serde(default)]
    pub resolutiondate: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub parent: Option<JiraParent>,
    #[serde(default)]
    pub project: Option<JiraNamed>,
    #[serde(default)]
    pub comment: Option<JiraComments>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct JiraNamed {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    /// Server/Data Center username.
    #[serde(default)]
    pub name: Option<String>,
}

impl JiraUser {
    fn to_user(&self) -> Option<ImportedUser> {
        ImportedUser::from_parts(
            self.name.as_deref(),
            self.email_address.as_deref(),
            self.display_name.as_deref(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct JiraParent {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JiraComments {
    #[serde(default)]
    pub comments: Vec<JiraComment>,
}

#[derive(Debug, Deserialize)]
pub struct JiraComment {
    #[serde(default)]
    pub author: Option<JiraUser>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub created: Option<String>,
}

/// Flattens an Atlassian Document Format node into plain text.
fn adf_to_text(node: &Value) -> String {
    match node {
        Value::String(text) => text.clone(),
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                return text.clone();
            }
            let children = map
                .get("content")
                .and_then(Value::as_array)
                .map(|nodes| nodes.iter().map(adf_to_text).collect::<Vec<_>>())
                .unwrap_or_default();
            let separator = match map.get("type").and_then(Value::as_str) {
                Some("doc") | Some("bulletList") | Some("orderedList") => "\n",
                _ => "",
            };
            children.join(separator)
        }
        Value::Array(nodes) => nodes.iter().map(adf_to_text).collect::<Vec<_>>().join("\n"),
        _ => String::new(),
    }
}

/// Fields gathered from either export shape before they become a task.
#[derive(Debug, Default)]
struct IssueRecord {
    row: Option<usize>,
    key: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    issue_type: Option<String>,
    assignee: Option<ImportedUser>,
    reporter: Option<ImportedUser>,
    created: Option<String>,
    due: Option<String>,
    resolved: Option<String>,
    labels: Vec<String>,
    story_points: Option<String>,
    parent: Option<String>,
    sprint: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JiraAdapter {
    settings: ImportSettings,
}

impl JiraAdapter {
    pub fn new(settings: ImportSettings) -> Self {
        Self { settings }
    }

    fn csv_records(table: &CsvTable) -> Vec<IssueRecord> {
        let key = table.header_index("Issue key");
        let summary = table.header_index("Summary");
        let description = table.header_index("Description");
        let status = table.header_index("Status");
        let priority = table.header_index("Priority");
        let issue_type = table.header_index("Issue Type");
        let assignee = table.header_index("Assignee");
        let assignee_id = table.find_header(&["Assignee Id", "Assignee email"]);
        let reporter = table.header_index("Reporter");
        let created = table.header_index("Created");
        let due = table.find_header(&["Due Date", "Due date"]);
        let resolved = table.header_index("Resolved");
        let labels = table.header_indices("Labels");
        let story_points = table.find_header(STORY_POINT_HEADERS);
        let parent = table.find_header(&["Parent", "Parent id", "Parent key", "Custom field (Epic Link)"]);
        let sprints = table.header_indices("Sprint");

        let user = |row: &CsvRow, name: Option<usize>, id: Option<usize>| {
            let id = row.get_opt(id);
            let email = id.filter(|v| v.contains('@'));
            ImportedUser::from_parts(None, email, row.get_opt(name))
        };

        table
            .rows
            .iter()
            .map(|row| IssueRecord {
                row: Some(row.line),
                key: non_blank(row.get_opt(key)),
                summary: non_blank(row.get_opt(summary)),
                description: non_blank(row.get_opt(description)),
                status: non_blank(row.get_opt(status)),
                priority: non_blank(row.get_opt(priority)),
                issue_type: non_blank(row.get_opt(issue_type)),
                assignee: user(row, assignee, assignee_id),
                reporter: user(row, reporter, None),
                created: non_blank(row.get_opt(created)),
                due: non_blank(row.get_opt(due)),
                resolved: non_blank(row.get_opt(resolved)),
                labels: labels
                    .iter()
                    .filter_map(|&i| row.get(i))
                    .flat_map(|value| value.split_whitespace().map(str::to_string))
                    .collect(),
                story_points: non_blank(row.get_opt(story_points)),
                parent: non_blank(row.get_opt(parent)),
                sprint: sprints.iter().rev().find_map(|&i| non_blank(row.get(i))),
            })
            .collect()
    }

    fn json_record(issue: &JiraIssue) -> IssueRecord {
        let fields = &issue.fields;
        let named = |n: &Option<JiraNamed>| n.as_ref().and_then(|n| non_blank(n.name.as_deref()));
        // Search responses list every custom field, mostly as nulls.
        let story_points = STORY_POINT_FIELDS
            .iter()
            .filter_map(|field| fields.extra.get(*field))
            .find_map(|value| match value {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) => normalize::parse_number(s).map(|_| s.trim().to_string()),
                _ => None,
            });

        IssueRecord {
            row: None,
            key: non_blank(issue.key.as_deref()).or_else(|| non_blank(issue.id.as_deref())),
            summary: non_blank(fields.summary.as_deref()),
            description: fields
                .description
                .as_ref()
                .map(adf_to_text)
                .and_then(|text| non_blank(Some(text.as_str()))),
            status: named(&fields.status),
            priority: named(&fields.priority),
            issue_type: named(&fields.issuetype),
            assignee: fields.assignee.as_ref().and_then(JiraUser::to_user),
            reporter: fields.reporter.as_ref().and_then(JiraUser::to_user),
            created: fields.created.clone(),
            due: fields.duedate.clone(),
            resolved: fields.resolutiondate.clone(),
            labels: fields.labels.clone(),
            story_points,
            parent: fields.parent.as_ref().and_then(|p| non_blank(p.key.as_deref())),
            sprint: None,
        }
    }

    fn build_task(&self, record: IssueRecord, result: &mut ImportResult) -> Option<ImportedTask> {
        let row = record.row;
        let Some(title) = clean_title(record.summary.as_deref(), &self.settings, result, row) else {
            let who = record.key.as_deref().unwrap_or("issue");
            result.skip_row(row_issue(format!("Skipped {} without a summary", who), row));
            return None;
        };

        let column = match record.status.as_deref() {
            Some(status) => normalize::status_column(status),
            None => self
                .settings
                .default_columns
                .first()
                .cloned()
                .unwrap_or_else(|| normalize::TODO_COLUMN.to_string()),
        };

        let mut task = ImportedTask::new(title, column);
        task.external_id = record.key;
        task.description = record.description;
        task.task_type = record.issue_type;
        task.parent_external_id = record.parent;

        if let Some(priority) = record.priority.as_deref() {
            match normalize::parse_priority(priority) {
                Some(parsed) => task.priority = parsed,
                None => result.warn(
                    row_issue(format!("Unknown priority '{}', using medium", priority), row)
                        .with_field("Priority"),
                ),
            }
        }

        if let Some(points) = record.story_points.as_deref() {
            match normalize::parse_number(points) {
                Some(value) => {
                    task.story_points = Some(value);
                    task.complexity = normalize::points_to_complexity(value);
                }
                None => result.warn(
                    row_issue(format!("Ignoring story points '{}'", points), row)
                        .with_field("Story Points"),
                ),
            }
        }

        task.created_at = record.created.as_deref().and_then(normalize::parse_date);
        if let Some(due) = record.due.as_deref() {
            task.due_date = normalize::parse_date(due);
            if task.due_date.is_none() {
                result.warn(
                    row_issue(format!("Unrecognized due date '{}'", due), row).with_field("Due Date"),
                );
            }
        }

        for label in &record.labels {
            task.add_label(label);
        }

        if let Some(sprint) = record.sprint {
            let note = format!("Sprint: {}", sprint);
            task.description = Some(match task.description.take() {
                Some(description) => format!("{}\n\n{}", description, note),
                None => note,
            });
        }

        task.assignee = record.assignee.map(|user| result.ensure_user(user));
        task.reporter = record.reporter.map(|user| result.ensure_user(user));

        if record.resolved.is_some() || normalize::is_done_column(&task.column) {
            task.mark_completed();
        }
        Some(task)
    }

    fn comments(issue: &JiraIssue, result: &mut ImportResult) {
        let (Some(key), Some(comments)) = (issue.key.as_deref(), issue.fields.comment.as_ref()) else {
            return;
        };
        for comment in &comments.comments {
            let Some(text) = comment
                .body
                .as_ref()
                .map(adf_to_text)
                .and_then(|text| non_blank(Some(text.as_str())))
            else {
                continue;
            };
            let author = comment
                .author
                .as_ref()
                .and_then(JiraUser::to_user)
                .map(|user| result.ensure_user(user));
            result.comments.push(ImportedComment {
                task_external_id: key.to_string(),
                author,
                text,
                created_at: comment.created.as_deref().and_then(normalize::parse_date),
            });
        }
    }
}

impl ImportAdapter for JiraAdapter {
    type Document = JiraDocument;

    fn source(&self) -> ImportSource {
        ImportSource::Jira
    }

    fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn detect(&self, input: &ImportInput<'_>) -> Detection {
        if let Some(json) = input.json() {
            let Some(issues) = json.get("issues").and_then(Value::as_array) else {
                return Detection::no();
            };
            let looks_like_issue = issues
                .first()
                .map(|issue| issue.get("key").is_some() && issue.get("fields").is_some())
                .unwrap_or(false);
            return if looks_like_issue {
                Detection::yes(0.98)
            } else {
                Detection::yes(0.6)
            };
        }

        let Some(table) = input.csv() else {
            return Detection::no();
        };
        let has_summary = table.has_header("Summary");
        if table.has_header("Issue key") {
            Detection::yes(if has_summary { 0.98 } else { 0.95 })
        } else if table.has_header("Issue id")
            || (has_summary && table.has_header("Issue Type"))
        {
            Detection::yes(0.8)
        } else if has_summary && input.filename_contains("jira") {
            Detection::yes(0.6)
        } else {
            Detection::no()
        }
    }

    fn parse(&self, input: &ImportInput<'_>) -> AdapterResult<Self::Document> {
        if input.looks_like_json() {
            let value: Value = serde_json::from_str(input.text())?;
            if value.get("issues").is_none() {
                return Err(ImportError::missing_field("issues"));
            }
            return Ok(JiraDocument::Json(serde_json::from_value(value)?));
        }
        Ok(JiraDocument::Csv(CsvTable::parse(input.text())?))
    }

    fn validate(&self, document: &Self::Document, result: &mut ImportResult) -> AdapterResult<()> {
        match document {
            JiraDocument::Csv(table) => {
                if !table.has_header("Summary") {
                    return Err(ImportError::missing_field("Summary"));
                }
                if !table.has_header("Issue key") {
                    result.warn(
                        ImportIssue::new("No 'Issue key' column; tasks will have no external id")
                            .with_field("Issue key"),
                    );
                }
                if !table.has_header("Status") {
                    result.warn(
                        ImportIssue::new("No 'Status' column; all issues go to the first column")
                            .with_field("Status"),
                    );
                }
            }
            JiraDocument::Json(search) => {
                if let Some(index) = search.issues.iter().position(|i| i.fields.summary.is_none()) {
                    result.warn(format!(
                        "Issue #{} has no summary field; check the export's field list",
                        index + 1
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
            JiraDocument::Csv(table) => {
                let project = table
                    .find_header(&["Project name", "Project"])
                    .and_then(|i| table.first_value(i));
                if let Some(name) = project.or(input.file_stem()) {
                    result.board.rename(name);
                }
                Self::csv_records(table)
            }
            JiraDocument::Json(search) => {
                let project = search
                    .issues
                    .iter()
                    .find_map(|i| i.fields.project.as_ref().and_then(|p| p.name.as_deref()));
                if let Some(name) = project.or(input.file_stem()) {
                    result.board.rename(name);
                }
                search.issues.iter().map(Self::json_record).collect()
            }
        };

        let tasks: Vec<ImportedTask> = records
            .into_iter()
            .filter_map(|record| self.build_task(record, result))
            .collect();

        // Workflow order, keeping first-seen order among statuses of equal rank.
        let mut columns: Vec<&str> = Vec::new();
        for task in &tasks {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(&task.column)) {
                columns.push(task.column.as_str());
            }
        }
        columns.sort_by_key(|column| normalize::column_rank(column));
        for column in columns {
            result.ensure_column(column);
        }

        let imported: HashSet<String> = tasks.iter().filter_map(|t| t.external_id.clone()).collect();
        for task in tasks {
            result.push_task(task);
        }

        if let JiraDocument::Json(search) = &document {
            for issue in &search.issues {
                if issue.key.as_ref().is_some_and(|key| imported.contains(key)) {
                    Self::comments(issue, result);
                }
            }
        }
        Ok(())
    }
}
