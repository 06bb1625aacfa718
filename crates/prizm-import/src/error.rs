//! Errors raised by adapters while parsing, validating or transforming input.

use prizm_domain::ImportIssue;
use thiserror::Error;

pub type AdapterResult<T> = Result<T, ImportError>;

/// A structural failure that aborts an import.
///
/// The pipeline never lets one escape: it is recorded in
/// [`prizm_domain::ImportResult::errors`] instead.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("The import file is empty")]
    Empty,

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String, row: Option<usize> },

    #[error("Invalid CSV: {message}")]
    InvalidCsv { message: String, row: Option<usize> },

    #[error("Missing required field '{field}'")]
    MissingField { field: String, row: Option<usize> },

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        field: String,
        message: String,
        row: Option<usize>,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl ImportError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        ImportError::MissingField {
            field: field.into(),
            row: None,
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        ImportError::InvalidValue {
            field: field.into(),
            message: message.into(),
            row: None,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ImportError::MissingField { field, .. } | ImportError::InvalidValue { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }

    pub fn row(&self) -> Option<usize> {
        match self {
            ImportError::InvalidJson { row, .. }
            | ImportError::InvalidCsv { row, .. }
            | ImportError::MissingField { row, .. }
            | ImportError::InvalidValue { row, .. } => *row,
            _ => None,
        }
    }

    pub fn to_issue(&self) -> ImportIssue {
        ImportIssue {
            message: self.to_string(),
            field: self.field().map(str::to_string),
            row: self.row(),
        }
    }
}

impl From<ImportError> for ImportIssue {
    fn from(err: ImportError) -> Self {
        err.to_issue()
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        let row = (err.line() > 0).then_some(err.line());
        ImportError::InvalidJson {
            message: err.to_string(),
            row,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        let row = err.position().map(|pos| pos.line() as usize);
        ImportError::InvalidCsv {
            message: err.to_string(),
            row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_issue_carries_field() {
        let issue = ImportError::missing_field("Summary").to_issue();
        assert_eq!(issue.field.as_deref(), Some("Summary"));
        assert_eq!(issue.message, "Missing required field 'Summary'");
        assert_eq!(issue.row, None);
    }

    #[test]
    fn test_json_error_keeps_line() {
        let err: ImportError = serde_json::from_str::<serde_json::Value>("{\n\"a\": }")
            .unwrap_err()
            .into();
        assert_eq!(err.row(), Some(2));
        assert!(err.to_string().starts_with("Invalid JSON"));
    }
}
