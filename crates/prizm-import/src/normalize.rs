//! Lookup tables and value parsers shared by every adapter.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use prizm_domain::TaskPriority;
use regex::Regex;

pub const TODO_COLUMN: &str = "To Do";
pub const IN_PROGRESS_COLUMN: &str = "In Progress";
pub const REVIEW_COLUMN: &str = "Review";
pub const DONE_COLUMN: &str = "Done";

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([0-9a-fA-F]{6}|[0-9a-fA-F]{3})$").expect("valid regex"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid regex"));

const PRIORITY_TABLE: &[(&str, TaskPriority)] = &[
    ("highest", TaskPriority::Urgent),
    ("critical", TaskPriority::Urgent),
    ("blocker", TaskPriority::Urgent),
    ("urgent", TaskPriority::Urgent),
    ("p0", TaskPriority::Urgent),
    ("p1", TaskPriority::Urgent),
    ("high", TaskPriority::High),
    ("major", TaskPriority::High),
    ("important", TaskPriority::High),
    ("p2", TaskPriority::High),
    ("medium", TaskPriority::Medium),
    ("normal", TaskPriority::Medium),
    ("moderate", TaskPriority::Medium),
    ("p3", TaskPriority::Medium),
    ("low", TaskPriority::Low),
    ("lowest", TaskPriority::Low),
    ("minor", TaskPriority::Low),
    ("trivial", TaskPriority::Low),
    ("p4", TaskPriority::Low),
    ("p5", TaskPriority::Low),
];

const NEGATIONS: &[&str] = &["not", "no", "non"];

const STATUS_TABLE: &[(&str, &str)] = &[
    ("to do", TODO_COLUMN),
    ("todo", TODO_COLUMN),
    ("open", TODO_COLUMN),
    ("backlog", TODO_COLUMN),
    ("new", TODO_COLUMN),
    ("not started", TODO_COLUMN),
    ("selected for development", TODO_COLUMN),
    ("reopened", TODO_COLUMN),
    ("pending", TODO_COLUMN),
    ("in progress", IN_PROGRESS_COLUMN),
    ("doing", IN_PROGRESS_COLUMN),
    ("started", IN_PROGRESS_COLUMN),
    ("active", IN_PROGRESS_COLUMN),
    ("in development", IN_PROGRESS_COLUMN),
    ("wip", IN_PROGRESS_COLUMN),
    ("review", REVIEW_COLUMN),
    ("in review", REVIEW_COLUMN),
    ("code review", REVIEW_COLUMN),
    ("under review", REVIEW_COLUMN),
    ("qa", REVIEW_COLUMN),
    ("in qa", REVIEW_COLUMN),
    ("testing", REVIEW_COLUMN),
    ("in testing", REVIEW_COLUMN),
    ("done", DONE_COLUMN),
    ("closed", DONE_COLUMN),
    ("resolved", DONE_COLUMN),
    ("complete", DONE_COLUMN),
    ("completed", DONE_COLUMN),
    ("finished", DONE_COLUMN),
    ("released", DONE_COLUMN),
];

const COLOR_TABLE: &[(&str, &str)] = &[
    ("green", "#61bd4f"),
    ("yellow", "#f2d600"),
    ("orange", "#ff9f1a"),
    ("red", "#eb5a46"),
    ("purple", "#c377e0"),
    ("blue", "#0079bf"),
    ("sky", "#00c2e0"),
    ("lime", "#51e898"),
    ("pink", "#ff78cb"),
    ("black", "#344563"),
    ("gray", "#8b8b8b"),
    ("grey", "#8b8b8b"),
    ("teal", "#2ab5a5"),
    ("aqua", "#2ab5a5"),
    ("brown", "#8d6e63"),
    ("indigo", "#5c6bc0"),
    ("magenta", "#d81b60"),
    ("white", "#ffffff"),
];

fn normalize_key(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps a tool's priority name onto PrizmAI's four levels.
///
/// Exact table hits win. Otherwise the leading word decides (`"P2 - High"`,
/// `"High priority"`), and later words only count in a phrase that names
/// the priority outright (`"Priority: high"`). Negated phrases never match.
pub fn parse_priority(value: &str) -> Option<TaskPriority> {
    let key = normalize_key(value);
    if key.is_empty() {
        return None;
    }
    let lookup = |k: &str| {
        PRIORITY_TABLE
            .iter()
            .find(|(name, _)| *name == k)
            .map(|(_, p)| *p)
    };
    if let Some(priority) = lookup(&key) {
        return Some(priority);
    }

    let words: Vec<&str> = key
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    if words.iter().any(|word| NEGATIONS.contains(word)) {
        return None;
    }
    let leading = words.first().and_then(|word| lookup(word));
    leading.or_else(|| {
        if words.contains(&"priority") {
            words.iter().find_map(|word| lookup(word))
        } else {
            None
        }
    })
}

/// Priority implied by a label name such as "High Priority" or "urgent".
pub fn priority_from_label(label: &str) -> Option<TaskPriority> {
    let key = normalize_key(label);
    let is_priority_label = key.contains("priority")
        || PRIORITY_TABLE.iter().any(|(name, _)| *name == key);
    if is_priority_label {
        parse_priority(&key)
    } else {
        None
    }
}

/// Parses the date shapes seen in tool exports; date-only values land at midnight UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    const ZONED: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f %z"];
    for format in ZONED {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    const NAIVE: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%b/%y %I:%M %p",
        "%d/%b/%Y %I:%M %p",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%m/%d/%Y %I:%M %p",
    ];
    for format in NAIVE {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    const DATES: &[&str] = &[
        "%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y", "%d/%b/%y", "%d/%b/%Y", "%b %d, %Y",
        "%d %b %Y",
    ];
    for format in DATES {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| Utc.from_utc_datetime(&dt));
        }
    }
    None
}

/// Resolves a named or hex color to lowercase `#rrggbb`, else `fallback`.
///
/// Named colors may carry shade qualifiers (`"dark-green"`, `"red_light"`).
pub fn parse_color(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if let Some(caps) = HEX_COLOR.captures(value) {
        let hex = caps[1].to_lowercase();
        if hex.len() == 3 {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            return format!("#{}", expanded);
        }
        return format!("#{}", hex);
    }
    let key = normalize_key(value);
    key.split(' ')
        .rev()
        .find_map(|word| COLOR_TABLE.iter().find(|(name, _)| *name == word))
        .map(|(_, hex)| hex.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// Maps story points onto the 1..=10 complexity scale.
pub fn points_to_complexity(points: f64) -> Option<u8> {
    if !points.is_finite() || points <= 0.0 {
        return None;
    }
    let complexity = match points {
        p if p <= 1.0 => 1,
        p if p <= 2.0 => 2,
        p if p <= 3.0 => 3,
        p if p <= 5.0 => 5,
        p if p <= 8.0 => 7,
        p if p <= 13.0 => 8,
        p if p <= 21.0 => 9,
        _ => 10,
    };
    Some(complexity)
}

pub fn parse_number(value: &str) -> Option<f64> {
    NUMBER
        .find(value.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Percent strings ("40%", "40", "0.4") to 0..=100.
pub fn parse_progress(value: &str) -> Option<u8> {
    let number = parse_number(value)?;
    let percent = if !value.contains('%') && number > 0.0 && number < 1.0 {
        number * 100.0
    } else {
        number
    };
    Some(percent.round().clamp(0.0, 100.0) as u8)
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match normalize_key(value).as_str() {
        "true" | "yes" | "y" | "1" | "x" | "done" | "complete" | "completed" | "\u{2713}" => {
            Some(true)
        }
        "false" | "no" | "n" | "0" | "" | "incomplete" | "open" => Some(false),
        _ => None,
    }
}

/// Splits comma- or semicolon-separated lists, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cuts a title to at most `max` characters.
pub fn truncate_title(title: &str, max: usize) -> String {
    let title = title.trim();
    if title.chars().count() <= max {
        title.to_string()
    } else {
        title.chars().take(max).collect::<String>().trim_end().to_string()
    }
}

/// Canonical column for a workflow status; unknown statuses are kept verbatim.
pub fn status_column(status: &str) -> String {
    let key = normalize_key(status);
    STATUS_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, column)| column.to_string())
        .unwrap_or_else(|| status.trim().to_string())
}

pub fn is_done_column(column: &str) -> bool {
    status_column(column) == DONE_COLUMN
}

/// Left-to-right board order for canonical columns; unknown columns sit before Done.
pub fn column_rank(column: &str) -> u8 {
    match status_column(column).as_str() {
        TODO_COLUMN => 0,
        IN_PROGRESS_COLUMN => 1,
        REVIEW_COLUMN => 2,
        DONE_COLUMN => 4,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_priority_table() {
        assert_eq!(parse_priority("Highest"), Some(TaskPriority::Urgent));
        assert_eq!(parse_priority("Blocker"), Some(TaskPriority::Urgent));
        assert_eq!(parse_priority("major"), Some(TaskPriority::High));
        assert_eq!(parse_priority("Normal"), Some(TaskPriority::Medium));
        assert_eq!(parse_priority("Trivial"), Some(TaskPriority::Low));
        assert_eq!(parse_priority("P2 - High"), Some(TaskPriority::High));
        assert_eq!(parse_priority("  "), None);
        assert_eq!(parse_priority("whenever"), None);
        assert_eq!(parse_priority("Priority: high"), Some(TaskPriority::High));
        assert_eq!(parse_priority("Not urgent"), None);
        assert_eq!(parse_priority("not important"), None);
        assert_eq!(parse_priority("ask if urgent"), None);
    }

    #[test]
    fn test_priority_from_label() {
        assert_eq!(priority_from_label("High Priority"), Some(TaskPriority::High));
        assert_eq!(priority_from_label("urgent"), Some(TaskPriority::Urgent));
        assert_eq!(priority_from_label("Low-hanging fruit"), None);
        assert_eq!(priority_from_label("Bug"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let rfc = parse_date("2024-03-12T10:15:30Z").unwrap();
        assert_eq!((rfc.year(), rfc.month(), rfc.day(), rfc.hour()), (2024, 3, 12, 10));

        let jira_api = parse_date("2024-03-12T10:15:30.000+0200").unwrap();
        assert_eq!(jira_api.hour(), 8);

        let jira_csv = parse_date("12/Mar/24 10:15 AM").unwrap();
        assert_eq!((jira_csv.year(), jira_csv.month(), jira_csv.hour()), (2024, 3, 10));

        let us = parse_date("03/12/2024").unwrap();
        assert_eq!((us.month(), us.day()), (3, 12));

        let european = parse_date("12.03.2024").unwrap();
        assert_eq!((european.month(), european.day()), (3, 12));

        assert!(parse_date("2024-03-12").is_some());
        assert!(parse_date("2024-03-12 09:30").is_some());
        assert!(parse_date("next tuesday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("green", "#000000"), "#61bd4f");
        assert_eq!(parse_color("green_dark", "#000000"), "#61bd4f");
        assert_eq!(parse_color("dark-orange", "#000000"), "#ff9f1a");
        assert_eq!(parse_color("#ABCDEF", "#000000"), "#abcdef");
        assert_eq!(parse_color("abc", "#000000"), "#aabbcc");
        assert_eq!(parse_color("none", "#123456"), "#123456");
        assert_eq!(parse_color("", "#123456"), "#123456");
    }

    #[test]
    fn test_points_to_complexity() {
        assert_eq!(points_to_complexity(0.0), None);
        assert_eq!(points_to_complexity(-3.0), None);
        assert_eq!(points_to_complexity(0.5), Some(1));
        assert_eq!(points_to_complexity(3.0), Some(3));
        assert_eq!(points_to_complexity(5.0), Some(5));
        assert_eq!(points_to_complexity(8.0), Some(7));
        assert_eq!(points_to_complexity(13.0), Some(8));
        assert_eq!(points_to_complexity(21.0), Some(9));
        assert_eq!(points_to_complexity(40.0), Some(10));
    }

    #[test]
    fn test_parse_progress() {
        assert_eq!(parse_progress("40%"), Some(40));
        assert_eq!(parse_progress("75"), Some(75));
        assert_eq!(parse_progress("0.25"), Some(25));
        assert_eq!(parse_progress("150"), Some(100));
        assert_eq!(parse_progress("n/a"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool(""), Some(false));
        assert_eq!(parse_bool("2024-01-01"), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b;c ,, "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_truncate_title_counts_chars() {
        assert_eq!(truncate_title("  short  ", 10), "short");
        assert_eq!(truncate_title("h\u{e9}llo world", 5), "h\u{e9}llo");
    }

    #[test]
    fn test_status_column() {
        assert_eq!(status_column("Selected for Development"), TODO_COLUMN);
        assert_eq!(status_column("in_progress"), IN_PROGRESS_COLUMN);
        assert_eq!(status_column("Code Review"), REVIEW_COLUMN);
        assert_eq!(status_column("RESOLVED"), DONE_COLUMN);
        assert_eq!(status_column(" Blocked "), "Blocked");
        assert!(is_done_column("closed"));
    }

    #[test]
    fn test_column_rank_orders_workflow() {
        let mut columns = vec!["Done", "Blocked", "To Do", "Review", "In Progress"];
        columns.sort_by_key(|c| column_rank(c));
        assert_eq!(columns, vec!["To Do", "In Progress", "Review", "Blocked", "Done"]);
    }
}
