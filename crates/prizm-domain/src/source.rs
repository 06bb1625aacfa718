use prizm_core::PrizmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The tool an import file was exported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Native,
    Trello,
    Jira,
    Asana,
    Csv,
}

impl ImportSource {
    pub const ALL: [ImportSource; 5] = [
        ImportSource::Native,
        ImportSource::Trello,
        ImportSource::Jira,
        ImportSource::Asana,
        ImportSource::Csv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportSource::Native => "native",
            ImportSource::Trello => "trello",
            ImportSource::Jira => "jira",
            ImportSource::Asana => "asana",
            ImportSource::Csv => "csv",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ImportSource::Native => "PrizmAI",
            ImportSource::Trello => "Trello",
            ImportSource::Jira => "Jira",
            ImportSource::Asana => "Asana",
            ImportSource::Csv => "CSV",
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImportSource {
    type Err = PrizmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" | "prizm" | "prizmai" => Ok(ImportSource::Native),
            "trello" => Ok(ImportSource::Trello),
            "jira" => Ok(ImportSource::Jira),
            "asana" => Ok(ImportSource::Asana),
            "csv" => Ok(ImportSource::Csv),
            other => Err(PrizmError::Validation(format!(
                "Unknown import format: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_aliases() {
        assert_eq!("Trello".parse::<ImportSource>().unwrap(), ImportSource::Trello);
        assert_eq!(
            "prizmai".parse::<ImportSource>().unwrap(),
            ImportSource::Native
        );
        assert_eq!(" csv ".parse::<ImportSource>().unwrap(), ImportSource::Csv);
        assert!("monday".parse::<ImportSource>().is_err());
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&ImportSource::Jira).unwrap();
        assert_eq!(json, "\"jira\"");
    }
}
