//! Trello board JSON exports ("Menu → Print, export and share → Export as JSON").

use chrono::{DateTime, TimeZone, Utc};
use prizm_core::ImportSettings;
use prizm_domain::{
    ChecklistItem, ImportResult, ImportSource, ImportedColumn, ImportedComment, ImportedTask,
    ImportedUser,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::adapter::{clean_title, non_blank, Detection, ImportAdapter};
use crate::error::{AdapterResult, ImportError};
use crate::input::ImportInput;
use crate::normalize::{self, TODO_COLUMN};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloBoard {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub lists: Vec<TrelloList>,
    #[serde(default)]
    pub cards: Vec<TrelloCard>,
    #[serde(default)]
    pub labels: Vec<TrelloLabel>,
    #[serde(default)]
    pub members: Vec<TrelloMember>,
    #[serde(default)]
    pub checklists: Vec<TrelloChecklist>,
    #[serde(default)]
    pub actions: Vec<TrelloAction>,
}

#[derive(Debug, Deserialize)]
pub struct TrelloList {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub pos: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloCard {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub id_list: Option<String>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub pos: f64,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub due_complete: bool,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub id_labels: Vec<String>,
    #[serde(default)]
    pub labels: Vec<TrelloLabel>,
    #[serde(default)]
    pub id_members: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrelloLabel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl TrelloLabel {
    /// Trello allows color-only labels; those are named after their color.
    fn display_name(&self) -> Option<String> {
        non_blank(self.name.as_deref()).or_else(|| {
            non_blank(self.color.as_deref()).map(|color| {
                let mut chars = color.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => color,
                }
            })
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloMember {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl TrelloMember {
    fn to_user(&self) -> Option<ImportedUser> {
        ImportedUser::from_parts(self.username.as_deref(), None, self.full_name.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloChecklist {
    #[serde(default)]
    pub id_card: String,
    #[serde(default)]
    pub pos: f64,
    #[serde(default)]
    pub check_items: Vec<TrelloCheckItem>,
}

#[derive(Debug, Deserialize)]
pub struct TrelloCheckItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pos: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloAction {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub data: TrelloActionData,
    #[serde(default)]
    pub member_creator: Option<TrelloMember>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrelloActionData {
    #[serde(default)]
    pub card: Option<TrelloCardRef>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrelloCardRef {
    pub id: String,
}

/// Trello object ids start with the creation time as 8 hex digits of Unix seconds.
fn created_at_from_id(id: &str) -> Option<DateTime<Utc>> {
    let prefix = id.get(..8)?;
    let seconds = u32::from_str_radix(prefix, 16).ok()?;
    Utc.timestamp_opt(i64::from(seconds), 0).single()
}

#[derive(Debug, Clone, Default)]
pub struct TrelloAdapter {
    settings: ImportSettings,
}

impl TrelloAdapter {
    pub fn new(settings: ImportSettings) -> Self {
        Self { settings }
    }

    fn cards_reference_lists(json: &Value) -> bool {
        json.get("cards")
            .and_then(Value::as_array)
            .map(|cards| cards.iter().any(|card| card.get("idList").is_some()))
            .unwrap_or(false)
    }
}

impl ImportAdapter for TrelloAdapter {
    type Document = TrelloBoard;

    fn source(&self) -> ImportSource {
        ImportSource::Trello
    }

    fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn detect(&self, input: &ImportInput<'_>) -> Detection {
        let Some(json) = input.json().filter(|json| json.is_object()) else {
            return Detection::no();
        };

        let has_lists = json.get("lists").map(Value::is_array).unwrap_or(false);
        let has_cards = json.get("cards").map(Value::is_array).unwrap_or(false);
        let references_lists = Self::cards_reference_lists(json);

        if has_lists && has_cards && references_lists {
            Detection::yes(0.98)
        } else if references_lists || json.get("idBoard").is_some() {
            Detection::yes(0.9)
        } else if has_lists && has_cards {
            Detection::yes(0.7)
        } else if input.filename_contains("trello") && (has_lists || has_cards) {
            Detection::yes(0.5)
        } else {
            Detection::no()
        }
    }

    fn parse(&self, input: &ImportInput<'_>) -> AdapterResult<Self::Document> {
        let value: Value = serde_json::from_str(input.text())?;
        if !value.is_object() {
            return Err(ImportError::UnsupportedFormat(
                "Trello export must be a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    fn validate(&self, board: &Self::Document, result: &mut ImportResult) -> AdapterResult<()> {
        if board.lists.is_empty() {
            return Err(ImportError::missing_field("lists"));
        }
        if board.cards.iter().any(|card| card.id_list.is_none()) {
            result.warn("Some cards have no list and will be placed in the first column");
        }
        Ok(())
    }

    fn transform(
        &self,
        board: Self::Document,
        input: &ImportInput<'_>,
        result: &mut ImportResult,
    ) -> AdapterResult<()> {
        let default_color = self.settings.default_label_color.as_str();

        if let Some(name) = board.name.as_deref().or(input.file_stem()) {
            result.board.rename(name);
        }
        result.board.set_description(board.desc.as_deref());
        result.board.external_id = board.id.clone();

        let mut lists: Vec<&TrelloList> = board.lists.iter().collect();
        lists.sort_by(|a, b| a.pos.total_cmp(&b.pos));

        let mut list_columns: HashMap<&str, String> = HashMap::new();
        let mut list_order: HashMap<&str, usize> = HashMap::new();
        let mut closed_lists: Vec<&str> = Vec::new();
        for list in lists {
            if list.closed {
                result.warn(format!("Skipped archived list '{}'", list.name));
                closed_lists.push(list.id.as_str());
                continue;
            }
            let name = if list.name.trim().is_empty() {
                "Untitled List"
            } else {
                list.name.as_str()
            };
            let column = match result.column(name) {
                Some(existing) => existing.name.clone(),
                None => {
                    let position = result.columns.len() as i32;
                    let column = ImportedColumn::new(name.trim().to_string(), position)
                        .with_external_id(list.id.as_str());
                    let canonical = column.name.clone();
                    result.columns.push(column);
                    canonical
                }
            };
            list_order.insert(list.id.as_str(), list_order.len());
            list_columns.insert(list.id.as_str(), column);
        }

        let mut label_names: HashMap<&str, String> = HashMap::new();
        for label in &board.labels {
            if let Some(name) = label.display_name() {
                let color = normalize::parse_color(label.color.as_deref().unwrap_or(""), default_color);
                let canonical = result.ensure_label(&name, &color);
                label_names.insert(label.id.as_str(), canonical);
            }
        }

        let mut member_keys: HashMap<&str, String> = HashMap::new();
        for member in &board.members {
            if let Some(user) = member.to_user() {
                member_keys.insert(member.id.as_str(), result.ensure_user(user));
            }
        }

        let mut checklists: HashMap<&str, Vec<&TrelloChecklist>> = HashMap::new();
        for checklist in &board.checklists {
            checklists
                .entry(checklist.id_card.as_str())
                .or_default()
                .push(checklist);
        }

        let first_column = result
            .columns
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| TODO_COLUMN.to_string());

        let mut cards: Vec<&TrelloCard> = board.cards.iter().collect();
        cards.sort_by(|a, b| {
            let rank = |card: &TrelloCard| {
                card.id_list
                    .as_deref()
                    .and_then(|id| list_order.get(id).copied())
                    .unwrap_or(usize::MAX)
            };
            rank(a).cmp(&rank(b)).then(a.pos.total_cmp(&b.pos))
        });

        let mut imported_cards: HashSet<&str> = HashSet::new();
        for card in cards {
            let card_label = card.name.as_deref().unwrap_or(card.id.as_str());
            if card.closed {
                result.skip_row(format!("Skipped archived card '{}'", card_label));
                continue;
            }
            if card
                .id_list
                .as_deref()
                .map(|id| closed_lists.contains(&id))
                .unwrap_or(false)
            {
                result.skip_row(format!("Skipped card '{}' in an archived list", card_label));
                continue;
            }
            let Some(title) = clean_title(card.name.as_deref(), &self.settings, result, None) else {
                result.skip_row(format!("Skipped card {} without a name", card.id));
                continue;
            };

            let column = match card.id_list.as_deref().and_then(|id| list_columns.get(id)) {
                Some(column) => column.clone(),
                None => {
                    if card.id_list.is_some() {
                        result.warn(format!(
                            "Card '{}' references an unknown list; placed in '{}'",
                            title, first_column
                        ));
                    }
                    first_column.clone()
                }
            };

            let mut task = ImportedTask::new(title, column);
            task.external_id = Some(card.id.clone());
            task.description = non_blank(card.desc.as_deref());
            task.due_date = card.due.as_deref().and_then(normalize::parse_date);
            task.start_date = card.start.as_deref().and_then(normalize::parse_date);
            task.created_at = created_at_from_id(&card.id);

            for label_id in &card.id_labels {
                if let Some(name) = label_names.get(label_id.as_str()) {
                    task.add_label(name);
                }
            }
            for label in &card.labels {
                if let Some(name) = label.display_name() {
                    let color =
                        normalize::parse_color(label.color.as_deref().unwrap_or(""), default_color);
                    let canonical = result.ensure_label(&name, &color);
                    task.add_label(&canonical);
                }
            }
            if let Some(priority) = task
                .labels
                .iter()
                .find_map(|label| normalize::priority_from_label(label))
            {
                task.priority = priority;
            }

            let mut members = card
                .id_members
                .iter()
                .filter_map(|id| member_keys.get(id.as_str()));
            task.assignee = members.next().cloned();
            if members.next().is_some() {
                result.warn(format!(
                    "Card '{}' has several members; only the first is assigned",
                    task.title
                ));
            }

            if let Some(lists) = checklists.get_mut(card.id.as_str()) {
                lists.sort_by(|a, b| a.pos.total_cmp(&b.pos));
                for checklist in lists.iter() {
                    let mut items: Vec<&TrelloCheckItem> = checklist.check_items.iter().collect();
                    items.sort_by(|a, b| a.pos.total_cmp(&b.pos));
                    task.checklist.extend(items.into_iter().map(|item| ChecklistItem {
                        text: item.name.trim().to_string(),
                        done: item.state == "complete",
                    }));
                }
            }

            if card.due_complete || normalize::is_done_column(&task.column) {
                task.mark_completed();
            }
            task.progress_from_checklist();

            imported_cards.insert(card.id.as_str());
            result.push_task(task);
        }

        for action in &board.actions {
            if action.kind != "commentCard" {
                continue;
            }
            let (Some(card), Some(text)) = (&action.data.card, non_blank(action.data.text.as_deref()))
            else {
                continue;
            };
            if !imported_cards.contains(card.id.as_str()) {
                continue;
            }
            let author = action
                .member_creator
                .as_ref()
                .and_then(TrelloMember::to_user)
                .map(|user| result.ensure_user(user));
            result.comments.push(ImportedComment {
                task_external_id: card.id.clone(),
                author,
                text,
                created_at: action.date.as_deref().and_then(normalize::parse_date),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_at_from_id() {
        let created = created_at_from_id("4d5ea62fd76aa1136000000c").unwrap();
        assert_eq!(created.timestamp(), 0x4d5ea62f);
        assert!(created_at_from_id("zz").is_none());
    }

    #[test]
    fn test_color_only_label_name() {
        let label = TrelloLabel {
            id: "l1".to_string(),
            name: Some(String::new()),
            color: Some("orange".to_string()),
        };
        assert_eq!(label.display_name().as_deref(), Some("Orange"));
    }

    #[test]
    fn test_detect_requires_json_object() {
        let adapter = TrelloAdapter::default();
        assert!(!adapter.detect(&ImportInput::new("[1, 2]")).can_handle);
        assert!(!adapter.detect(&ImportInput::new("name,idList\n")).can_handle);
        let detection = adapter.detect(&ImportInput::new(
            r#"{"lists": [{"id": "a"}], "cards": [{"id": "c", "idList": "a"}]}"#,
        ));
        assert!(detection.confidence >= 0.95);
    }
}
