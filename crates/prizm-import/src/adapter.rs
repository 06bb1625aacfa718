//! The parse → validate → transform contract every format adapter follows.

use prizm_core::ImportSettings;
use prizm_domain::{ImportIssue, ImportResult, ImportSource};
use serde::Serialize;

use crate::error::{AdapterResult, ImportError};
use crate::input::ImportInput;

/// How confident an adapter is that it understands an input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub can_handle: bool,
    pub confidence: f64,
}

impl Detection {
    pub fn no() -> Self {
        Self {
            can_handle: false,
            confidence: 0.0,
        }
    }

    pub fn yes(confidence: f64) -> Self {
        Self {
            can_handle: true,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// A format-specific importer.
///
/// Implementors decode the raw input into their own `Document` type, check
/// it, and write normalized records into an [`ImportResult`]. The provided
/// [`ImportAdapter::run`] drives the stages and turns any [`ImportError`]
/// into a failed result.
pub trait ImportAdapter: Send + Sync {
    type Document;

    fn source(&self) -> ImportSource;

    fn settings(&self) -> &ImportSettings;

    fn detect(&self, input: &ImportInput<'_>) -> Detection;

    fn parse(&self, input: &ImportInput<'_>) -> AdapterResult<Self::Document>;

    /// Checks required structure. Non-fatal findings go to `result` as warnings.
    fn validate(&self, _document: &Self::Document, _result: &mut ImportResult) -> AdapterResult<()> {
        Ok(())
    }

    fn transform(
        &self,
        document: Self::Document,
        input: &ImportInput<'_>,
        result: &mut ImportResult,
    ) -> AdapterResult<()>;

    fn run(&self, input: &ImportInput<'_>) -> ImportResult {
        let source = ImportAdapter::source(self);
        let mut result = ImportResult::new(source);

        let outcome = if input.is_blank() {
            Err(ImportError::Empty)
        } else {
            self.parse(input).and_then(|document| {
                self.validate(&document, &mut result)?;
                self.transform(document, input, &mut result)
            })
        };

        if input.was_lossy() {
            result.warn("File is not valid UTF-8; undecodable bytes were replaced");
        }

        if let Err(err) = outcome {
            tracing::warn!("{} import failed: {}", source.display_name(), err);
            result.error(err);
        }

        result.finalize(&self.settings().default_label_color);

        if result.success && result.tasks.is_empty() {
            result.warn("No tasks found in the import file");
        }

        tracing::info!(
            source = source.as_str(),
            success = result.success,
            columns = result.stats.columns,
            tasks = result.stats.tasks,
            labels = result.stats.labels,
            skipped = result.stats.rows_skipped,
            "Import finished"
        );
        result
    }
}

/// Object-safe view of an [`ImportAdapter`], used by the factory's registry.
pub trait FormatAdapter: Send + Sync {
    fn source(&self) -> ImportSource;

    fn detect(&self, input: &ImportInput<'_>) -> Detection;

    fn import(&self, input: &ImportInput<'_>) -> ImportResult;
}

/// Wraps a concrete adapter so it can be stored as `Box<dyn FormatAdapter>`.
pub struct Registered<A>(pub A);

impl<A: ImportAdapter> FormatAdapter for Registered<A> {
    fn source(&self) -> ImportSource {
        self.0.source()
    }

    fn detect(&self, input: &ImportInput<'_>) -> Detection {
        self.0.detect(input)
    }

    fn import(&self, input: &ImportInput<'_>) -> ImportResult {
        self.0.run(input)
    }
}

pub fn boxed<A: ImportAdapter + 'static>(adapter: A) -> Box<dyn FormatAdapter> {
    Box::new(Registered(adapter))
}

/// Trims and truncates a title, warning on truncation. Blank titles yield `None`.
pub(crate) fn clean_title(
    raw: Option<&str>,
    settings: &ImportSettings,
    result: &mut ImportResult,
    row: Option<usize>,
) -> Option<String> {
    let raw = raw.map(str::trim).filter(|t| !t.is_empty())?;
    let title = crate::normalize::truncate_title(raw, settings.max_title_length);
    if title.chars().count() < raw.chars().count() {
        let mut issue = ImportIssue::new(format!(
            "Title truncated to {} characters",
            settings.max_title_length
        ))
        .with_field("title");
        if let Some(row) = row {
            issue = issue.at_row(row);
        }
        result.warn(issue);
    }
    Some(title)
}

/// Trims and drops blank strings.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Builds an issue pinned to an optional row.
pub(crate) fn row_issue(message: impl Into<String>, row: Option<usize>) -> ImportIssue {
    let issue = ImportIssue::new(message);
    match row {
        Some(row) => issue.at_row(row),
        None => issue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LinesAdapter {
        settings: ImportSettings,
    }

    impl ImportAdapter for LinesAdapter {
        type Document = Vec<String>;

        fn source(&self) -> ImportSource {
            ImportSource::Csv
        }

        fn settings(&self) -> &ImportSettings {
            &self.settings
        }

        fn detect(&self, _input: &ImportInput<'_>) -> Detection {
            Detection::yes(0.1)
        }

        fn parse(&self, input: &ImportInput<'_>) -> AdapterResult<Self::Document> {
            Ok(input.text().lines().map(str::to_string).collect())
        }

        fn validate(&self, document: &Self::Document, _result: &mut ImportResult) -> AdapterResult<()> {
            if document.iter().any(|line| line == "!") {
                return Err(ImportError::invalid_value("line", "bang"));
            }
            Ok(())
        }

        fn transform(
            &self,
            document: Self::Document,
            _input: &ImportInput<'_>,
            result: &mut ImportResult,
        ) -> AdapterResult<()> {
            for line in document {
                if let Some(title) = clean_title(Some(&line), &self.settings, result, None) {
                    let column = result.ensure_column("To Do");
                    result.push_task(prizm_domain::ImportedTask::new(title, column));
                }
            }
            Ok(())
        }
    }

    fn adapter() -> LinesAdapter {
        LinesAdapter {
            settings: ImportSettings {
                max_title_length: 5,
                ..ImportSettings::default()
            },
        }
    }

    #[test]
    fn test_run_success() {
        let result = adapter().run(&ImportInput::new("one\ntwo\n"));
        assert!(result.success);
        assert_eq!(result.stats.tasks, 2);
        assert_eq!(result.stats.columns, 1);
    }

    #[test]
    fn test_run_captures_validation_error() {
        let result = adapter().run(&ImportInput::new("one\n!\n"));
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field.as_deref(), Some("line"));
        assert!(result.tasks.is_empty());
    }

    #[test]
    fn test_run_rejects_blank_input() {
        let result = adapter().run(&ImportInput::new("   \n"));
        assert!(!result.success);
        assert_eq!(result.errors[0].message, "The import file is empty");
    }

    #[test]
    fn test_title_truncation_warns() {
        let result = adapter().run(&ImportInput::new("abcdefgh\n"));
        assert!(result.success);
        assert_eq!(result.tasks[0].title, "abcde");
        assert_eq!(result.warnings[0].field.as_deref(), Some("title"));
    }

    #[test]
    fn test_lossy_input_warns_but_imports() {
        let result = adapter().run(&ImportInput::from_bytes(b"ok\n\xFF\n"));
        assert!(result.success);
        assert_eq!(result.stats.tasks, 2);
        assert!(result.warnings[0].message.contains("UTF-8"));
    }

    #[test]
    fn test_registered_adapter_is_object_safe() {
        let registered = boxed(adapter());
        assert_eq!(registered.source(), ImportSource::Csv);
        assert!(registered.detect(&ImportInput::new("x")).can_handle);
        assert!(registered.import(&ImportInput::new("x")).success);
    }
}
