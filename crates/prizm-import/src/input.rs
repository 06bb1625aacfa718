use std::borrow::Cow;
use std::cell::OnceCell;
use std::path::Path;

use serde_json::Value;

use crate::csv_table::CsvTable;

/// Raw import content plus the optional original filename.
///
/// JSON and CSV views are decoded at most once and shared between the
/// detector and the adapter that ends up handling the input.
pub struct ImportInput<'a> {
    text: Cow<'a, str>,
    filename: Option<&'a str>,
    lossy: bool,
    json: OnceCell<Option<Value>>,
    csv: OnceCell<Option<CsvTable>>,
}

impl<'a> ImportInput<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::from_cow(Cow::Borrowed(text.trim_start_matches('\u{feff}')), false)
    }

    /// Decodes uploaded bytes; invalid UTF-8 sequences are replaced and flagged.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::from_cow(Cow::Borrowed(text), false),
            Err(_) => Self::from_cow(String::from_utf8_lossy(bytes), true),
        }
    }

    fn from_cow(text: Cow<'a, str>, lossy: bool) -> Self {
        Self {
            text,
            filename: None,
            lossy,
            json: OnceCell::new(),
            csv: OnceCell::new(),
        }
    }

    pub fn with_filename(mut self, filename: &'a str) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename
    }

    /// Lowercased extension of the filename, if any.
    pub fn extension(&self) -> Option<String> {
        self.filename
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
    }

    /// Filename without directory or extension, used as a fallback board name.
    pub fn file_stem(&self) -> Option<&str> {
        self.filename
            .and_then(|name| Path::new(name).file_stem())
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.trim().is_empty())
    }

    pub fn filename_contains(&self, needle: &str) -> bool {
        self.filename
            .map(|name| name.to_lowercase().contains(needle))
            .unwrap_or(false)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn was_lossy(&self) -> bool {
        self.lossy
    }

    pub fn looks_like_json(&self) -> bool {
        matches!(self.text.trim_start().chars().next(), Some('{') | Some('['))
    }

    /// The input as a JSON value, when it is one.
    pub fn json(&self) -> Option<&Value> {
        self.json
            .get_or_init(|| {
                if !self.looks_like_json() {
                    return None;
                }
                serde_json::from_str(&self.text).ok()
            })
            .as_ref()
    }

    /// The input as a CSV table, when it reads as one with a non-empty header.
    pub fn csv(&self) -> Option<&CsvTable> {
        self.csv
            .get_or_init(|| {
                if self.is_blank() || self.looks_like_json() {
                    return None;
                }
                CsvTable::parse(&self.text).ok()
            })
            .as_ref()
    }
}
