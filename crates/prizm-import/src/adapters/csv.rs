//! Spreadsheet exports of unknown origin, mapped header-by-header.

use prizm_core::ImportSettings;
use prizm_domain::{ImportIssue, ImportResult, ImportSource, ImportedTask, ImportedUser};

use crate::adapter::{clean_title, row_issue, Detection, ImportAdapter};
use crate::csv_table::{CsvRow, CsvTable};
use crate::error::{AdapterResult, ImportError};
use crate::field_mapper::{CanonicalField, FieldMapper, FieldMapping};
use crate::input::ImportInput;
use crate::normalize;

/// A parsed table together with the header mapping chosen for it.
#[derive(Debug)]
pub struct MappedTable {
    pub table: CsvTable,
    pub mapping: FieldMapping,
}

impl MappedTable {
    fn value<'r>(&self, row: &'r CsvRow, field: CanonicalField) -> Option<&'r str> {
        row.get_opt(self.mapping.get(field))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvAdapter {
    settings: ImportSettings,
}

impl CsvAdapter {
    pub fn new(settings: ImportSettings) -> Self {
        Self { settings }
    }

    fn mapper(&self) -> FieldMapper {
        FieldMapper::with_overrides(&self.settings.field_overrides)
    }

    fn default_column(&self) -> String {
        self.settings
            .default_columns
            .first()
            .cloned()
            .unwrap_or_else(|| normalize::TODO_COLUMN.to_string())
    }

    fn done_column(&self) -> String {
        self.settings
            .default_columns
            .last()
            .cloned()
            .unwrap_or_else(|| normalize::DONE_COLUMN.to_string())
    }

    fn parse_date_field(
        value: Option<&str>,
        field: CanonicalField,
        row: usize,
        result: &mut ImportResult,
    ) -> Option<chrono::DateTime<chrono::Utc>> {
        let value = value?;
        let parsed = normalize::parse_date(value);
        if parsed.is_none() {
            result.warn(
                row_issue(format!("Unrecognized date '{}'", value), Some(row))
                    .with_field(field.as_str()),
            );
        }
        parsed
    }

    fn build_task(
        &self,
        mapped: &MappedTable,
        row: &CsvRow,
        result: &mut ImportResult,
    ) -> Option<ImportedTask> {
        use CanonicalField as F;

        let line = Some(row.line);
        let Some(title) = clean_title(mapped.value(row, F::Title), &self.settings, result, line)
        else {
            result.skip_row(row_issue("Skipped row without a title", line).with_field("title"));
            return None;
        };

        let completed = mapped
            .value(row, F::Completed)
            .map(|value| {
                normalize::parse_bool(value)
                    .unwrap_or_else(|| normalize::parse_date(value).is_some())
            })
            .unwrap_or(false);

        let column = match mapped.value(row, F::Column) {
            Some(status) => normalize::status_column(status),
            None if completed => self.done_column(),
            None => self.default_column(),
        };

        let mut task = ImportedTask::new(title, column);
        task.description = mapped.value(row, F::Description).map(str::to_string);
        task.external_id = mapped.value(row, F::ExternalId).map(str::to_string);
        task.task_type = mapped.value(row, F::TaskType).map(str::to_string);
        task.parent_external_id = mapped.value(row, F::Parent).map(str::to_string);

        if let Some(priority) = mapped.value(row, F::Priority) {
            match normalize::parse_priority(priority) {
                Some(parsed) => task.priority = parsed,
                None => result.warn(
                    row_issue(format!("Unknown priority '{}', using medium", priority), line)
                        .with_field(F::Priority.as_str()),
                ),
            }
        }

        task.due_date = Self::parse_date_field(mapped.value(row, F::DueDate), F::DueDate, row.line, result);
        task.start_date =
            Self::parse_date_field(mapped.value(row, F::StartDate), F::StartDate, row.line, result);
        task.created_at =
            Self::parse_date_field(mapped.value(row, F::CreatedAt), F::CreatedAt, row.line, result);

        let default_color = self.settings.default_label_color.clone();
        for label in mapped
            .value(row, F::Labels)
            .map(normalize::split_list)
            .unwrap_or_default()
        {
            let canonical = result.ensure_label(&label, &default_color);
            task.add_label(&canonical);
        }

        if let Some(points) = mapped.value(row, F::StoryPoints) {
            match normalize::parse_number(points) {
                Some(points) => {
                    task.story_points = Some(points);
                    task.complexity = normalize::points_to_complexity(points);
                }
                None => result.warn(
                    row_issue(format!("Story points '{}' are not a number", points), line)
                        .with_field(F::StoryPoints.as_str()),
                ),
            }
        }

        if let Some(progress) = mapped.value(row, F::Progress).and_then(normalize::parse_progress) {
            task.progress = progress;
        }

        task.assignee = mapped
            .value(row, F::Assignee)
            .and_then(person)
            .map(|user| result.ensure_user(user));
        task.reporter = mapped
            .value(row, F::Reporter)
            .and_then(person)
            .map(|user| result.ensure_user(user));

        if completed || normalize::is_done_column(&task.column) {
            task.mark_completed();
        }
        Some(task)
    }
}

/// A cell naming a person: values with `@` are emails, anything else a display name.
fn person(value: &str) -> Option<ImportedUser> {
    if value.contains('@') {
        ImportedUser::from_parts(None, Some(value), None)
    } else {
        ImportedUser::from_parts(None, None, Some(value))
    }
}

impl ImportAdapter for CsvAdapter {
    type Document = MappedTable;

    fn source(&self) -> ImportSource {
        ImportSource::Csv
    }

    fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Low-confidence catch-all so tool-specific adapters win any tie.
    fn detect(&self, input: &ImportInput<'_>) -> Detection {
        if input.looks_like_json() {
            return Detection::no();
        }
        let Some(table) = input.csv() else {
            return Detection::no();
        };
        let mapping = self.mapper().map_headers(&table.headers);
        if !mapping.contains(CanonicalField::Title) {
            return Detection::no();
        }

        let mut confidence = 0.45 + 0.05 * (mapping.len() - 1).min(2) as f64;
        if matches!(input.extension().as_deref(), Some("csv" | "tsv")) {
            confidence += 0.05;
        }
        Detection::yes(confidence.min(0.6))
    }

    fn parse(&self, input: &ImportInput<'_>) -> AdapterResult<Self::Document> {
        let table = CsvTable::parse(input.text())?;
        let mapping = self.mapper().map_headers(&table.headers);
        Ok(MappedTable { table, mapping })
    }

    fn validate(&self, document: &Self::Document, result: &mut ImportResult) -> AdapterResult<()> {
        if !document.mapping.contains(CanonicalField::Title) {
            return Err(ImportError::missing_field("title"));
        }
        let unmapped = document.mapping.unmapped();
        if !unmapped.is_empty() {
            result.warn(format!("Ignored unmapped columns: {}", unmapped.join(", ")));
        }
        if !document.mapping.contains(CanonicalField::Column) {
            result.warn(
                ImportIssue::new("No status column found; tasks use the default columns")
                    .with_field(CanonicalField::Column.as_str()),
            );
        }
        Ok(())
    }

    fn transform(
        &self,
        document: Self::Document,
        input: &ImportInput<'_>,
        result: &mut ImportResult,
    ) -> AdapterResult<()> {
        if let Some(stem) = input.file_stem() {
            result.board.rename(stem);
        }

        tracing::debug!(
            mapped = document.mapping.len(),
            rows = document.table.rows.len(),
            "Mapped CSV headers"
        );

        if !document.mapping.contains(CanonicalField::Column) {
            for column in &self.settings.default_columns {
                result.ensure_column(column);
            }
        }

        for row in &document.table.rows {
            if let Some(mut task) = self.build_task(&document, row, result) {
                task.column = result.ensure_column(&task.column);
                result.push_task(task);
            }
        }
        Ok(())
    }
}
