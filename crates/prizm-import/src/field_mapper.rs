//! Resolves free-form spreadsheet headers to canonical task fields.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::ImportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Title,
    Description,
    Column,
    Priority,
    Assignee,
    Reporter,
    DueDate,
    StartDate,
    CreatedAt,
    Labels,
    StoryPoints,
    Progress,
    ExternalId,
    TaskType,
    Parent,
    Completed,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 16] = [
        CanonicalField::Title,
        CanonicalField::Description,
        CanonicalField::Column,
        CanonicalField::Priority,
        CanonicalField::Assignee,
        CanonicalField::Reporter,
        CanonicalField::DueDate,
        CanonicalField::StartDate,
        CanonicalField::CreatedAt,
        CanonicalField::Labels,
        CanonicalField::StoryPoints,
        CanonicalField::Progress,
        CanonicalField::ExternalId,
        CanonicalField::TaskType,
        CanonicalField::Parent,
        CanonicalField::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Title => "title",
            CanonicalField::Description => "description",
            CanonicalField::Column => "column",
            CanonicalField::Priority => "priority",
            CanonicalField::Assignee => "assignee",
            CanonicalField::Reporter => "reporter",
            CanonicalField::DueDate => "due_date",
            CanonicalField::StartDate => "start_date",
            CanonicalField::CreatedAt => "created_at",
            CanonicalField::Labels => "labels",
            CanonicalField::StoryPoints => "story_points",
            CanonicalField::Progress => "progress",
            CanonicalField::ExternalId => "external_id",
            CanonicalField::TaskType => "task_type",
            CanonicalField::Parent => "parent",
            CanonicalField::Completed => "completed",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        let key = match key.as_str() {
            "status" => "column",
            "due" => "due_date",
            "tags" => "labels",
            "points" => "story_points",
            "id" => "external_id",
            other => other,
        };
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.as_str() == key)
            .ok_or_else(|| ImportError::invalid_value("field", format!("unknown field '{}'", s)))
    }
}

/// Exact header names, compared after [`FieldMapper::normalize_header`].
const EXACT_HEADERS: &[(&str, CanonicalField)] = &[
    ("title", CanonicalField::Title),
    ("name", CanonicalField::Title),
    ("summary", CanonicalField::Title),
    ("task", CanonicalField::Title),
    ("task name", CanonicalField::Title),
    ("card name", CanonicalField::Title),
    ("subject", CanonicalField::Title),
    ("headline", CanonicalField::Title),
    ("description", CanonicalField::Description),
    ("desc", CanonicalField::Description),
    ("notes", CanonicalField::Description),
    ("details", CanonicalField::Description),
    ("body", CanonicalField::Description),
    ("content", CanonicalField::Description),
    ("card description", CanonicalField::Description),
    ("status", CanonicalField::Column),
    ("column", CanonicalField::Column),
    ("list", CanonicalField::Column),
    ("list name", CanonicalField::Column),
    ("stage", CanonicalField::Column),
    ("state", CanonicalField::Column),
    ("section", CanonicalField::Column),
    ("section/column", CanonicalField::Column),
    ("board column", CanonicalField::Column),
    ("priority", CanonicalField::Priority),
    ("importance", CanonicalField::Priority),
    ("severity", CanonicalField::Priority),
    ("urgency", CanonicalField::Priority),
    ("assignee", CanonicalField::Assignee),
    ("assigned to", CanonicalField::Assignee),
    ("assignee email", CanonicalField::Assignee),
    ("assignee name", CanonicalField::Assignee),
    ("owner", CanonicalField::Assignee),
    ("responsible", CanonicalField::Assignee),
    ("member", CanonicalField::Assignee),
    ("members", CanonicalField::Assignee),
    ("reporter", CanonicalField::Reporter),
    ("created by", CanonicalField::Reporter),
    ("creator", CanonicalField::Reporter),
    ("author", CanonicalField::Reporter),
    ("requester", CanonicalField::Reporter),
    ("due date", CanonicalField::DueDate),
    ("due", CanonicalField::DueDate),
    ("due on", CanonicalField::DueDate),
    ("deadline", CanonicalField::DueDate),
    ("target date", CanonicalField::DueDate),
    ("end date", CanonicalField::DueDate),
    ("start date", CanonicalField::StartDate),
    ("start", CanonicalField::StartDate),
    ("start on", CanonicalField::StartDate),
    ("begin date", CanonicalField::StartDate),
    ("created", CanonicalField::CreatedAt),
    ("created at", CanonicalField::CreatedAt),
    ("created date", CanonicalField::CreatedAt),
    ("date created", CanonicalField::CreatedAt),
    ("creation date", CanonicalField::CreatedAt),
    ("labels", CanonicalField::Labels),
    ("label", CanonicalField::Labels),
    ("tags", CanonicalField::Labels),
    ("tag", CanonicalField::Labels),
    ("categories", CanonicalField::Labels),
    ("category", CanonicalField::Labels),
    ("story points", CanonicalField::StoryPoints),
    ("story point estimate", CanonicalField::StoryPoints),
    ("points", CanonicalField::StoryPoints),
    ("estimate", CanonicalField::StoryPoints),
    ("sp", CanonicalField::StoryPoints),
    ("progress", CanonicalField::Progress),
    ("percent complete", CanonicalField::Progress),
    ("% complete", CanonicalField::Progress),
    ("completion", CanonicalField::Progress),
    ("id", CanonicalField::ExternalId),
    ("key", CanonicalField::ExternalId),
    ("issue key", CanonicalField::ExternalId),
    ("task id", CanonicalField::ExternalId),
    ("card id", CanonicalField::ExternalId),
    ("reference", CanonicalField::ExternalId),
    ("type", CanonicalField::TaskType),
    ("issue type", CanonicalField::TaskType),
    ("task type", CanonicalField::TaskType),
    ("kind", CanonicalField::TaskType),
    ("parent", CanonicalField::Parent),
    ("parent id", CanonicalField::Parent),
    ("parent task", CanonicalField::Parent),
    ("parent key", CanonicalField::Parent),
    ("epic link", CanonicalField::Parent),
    ("completed", CanonicalField::Completed),
    ("done", CanonicalField::Completed),
    ("is done", CanonicalField::Completed),
    ("completed at", CanonicalField::Completed),
];

/// Substring fallbacks, tried in order once exact matching is exhausted.
const PATTERN_FALLBACKS: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::ExternalId, &["issue key", "task id", "card id"]),
    (CanonicalField::StoryPoints, &["story point", "points", "estimate"]),
    (CanonicalField::DueDate, &["due", "deadline"]),
    (CanonicalField::StartDate, &["start"]),
    (CanonicalField::CreatedAt, &["created"]),
    (CanonicalField::Reporter, &["report", "creator"]),
    (CanonicalField::Assignee, &["assign", "owner"]),
    (CanonicalField::Priority, &["priority"]),
    (CanonicalField::Labels, &["label", "tag"]),
    (CanonicalField::Progress, &["progress", "percent"]),
    (CanonicalField::Parent, &["parent", "epic"]),
    (CanonicalField::TaskType, &["type"]),
    (CanonicalField::Column, &["status", "column", "stage", "section", "list"]),
    (CanonicalField::Description, &["description", "desc", "note", "detail"]),
    (CanonicalField::Title, &["title", "summary", "name"]),
];

/// Header index per canonical field, plus the headers nothing claimed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldMapping {
    columns: BTreeMap<CanonicalField, usize>,
    unmapped: Vec<String>,
}

impl FieldMapping {
    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldMapper {
    overrides: HashMap<String, CanonicalField>,
}

impl FieldMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapper from `header -> field name` pairs, e.g. from config.
    /// Pairs naming an unknown field are logged and ignored.
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut mapper = Self::new();
        for (header, field) in overrides {
            match field.parse::<CanonicalField>() {
                Ok(field) => mapper.set_override(header, field),
                Err(err) => tracing::warn!("Ignoring field override for '{}': {}", header, err),
            }
        }
        mapper
    }

    pub fn set_override(&mut self, header: &str, field: CanonicalField) {
        self.overrides.insert(Self::normalize_header(header), field);
    }

    /// Lowercases, trims, and folds `_`, `-` and whitespace runs to single spaces.
    pub fn normalize_header(header: &str) -> String {
        header
            .trim()
            .trim_start_matches('\u{feff}')
            .to_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn exact(&self, normalized: &str) -> Option<CanonicalField> {
        self.overrides.get(normalized).copied().or_else(|| {
            EXACT_HEADERS
                .iter()
                .find(|(name, _)| *name == normalized)
                .map(|(_, field)| *field)
        })
    }

    fn pattern(normalized: &str) -> Option<CanonicalField> {
        PATTERN_FALLBACKS
            .iter()
            .find(|(_, needles)| needles.iter().any(|needle| normalized.contains(needle)))
            .map(|(field, _)| *field)
    }

    /// Resolves a single header in isolation.
    pub fn map_header(&self, header: &str) -> Option<CanonicalField> {
        let normalized = Self::normalize_header(header);
        if normalized.is_empty() {
            return None;
        }
        self.exact(&normalized).or_else(|| Self::pattern(&normalized))
    }

    /// Maps a whole header row. Exact and override hits are claimed before
    /// any pattern fallback, and each field is claimed by the first header
    /// that resolves to it.
    pub fn map_headers(&self, headers: &[String]) -> FieldMapping {
        let mut mapping = FieldMapping::default();
        let normalized: Vec<String> = headers.iter().map(|h| Self::normalize_header(h)).collect();
        let mut claimed = vec![false; headers.len()];

        for (index, header) in normalized.iter().enumerate() {
            if let Some(field) = self.exact(header) {
                if !mapping.columns.contains_key(&field) {
                    mapping.columns.insert(field, index);
                    claimed[index] = true;
                }
            }
        }

        for (index, header) in normalized.iter().enumerate() {
            if claimed[index] || header.is_empty() {
                continue;
            }
            if let Some(field) = Self::pattern(header) {
                if !mapping.columns.contains_key(&field) {
                    mapping.columns.insert(field, index);
                    claimed[index] = true;
                }
            }
        }

        mapping.unmapped = headers
            .iter()
            .zip(claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(header, _)| header.clone())
            .collect();
        mapping
    }
}
