//! A fully-read CSV document with row line numbers preserved.

use crate::error::{AdapterResult, ImportError};

#[derive(Debug, Clone)]
pub struct CsvRow {
    /// 1-based line of the record in the source text.
    pub line: usize,
    pub values: Vec<String>,
}

impl CsvRow {
    /// The trimmed cell at `index`, or `None` when absent or blank.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values
            .get(index)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn get_opt(&self, index: Option<usize>) -> Option<&str> {
        index.and_then(|i| self.get(i))
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
    pub delimiter: u8,
}

impl CsvTable {
    pub fn parse(text: &str) -> AdapterResult<Self> {
        let text = text.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Err(ImportError::Empty);
        }

        let delimiter = sniff_delimiter(text);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::InvalidCsv {
                message: "header row is empty".to_string(),
                row: Some(1),
            });
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            let row = CsvRow {
                line,
                values: record.iter().map(str::to_string).collect(),
            };
            if !row.is_blank() {
                rows.push(row);
            }
        }

        Ok(Self {
            headers,
            rows,
            delimiter,
        })
    }

    /// Index of the first header equal to `name`, ignoring case and surrounding space.
    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.trim()))
    }

    /// First match among several candidate header names.
    pub fn find_header(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| self.header_index(name))
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header_index(name).is_some()
    }

    /// Every index whose header equals `name`; exports repeat some columns.
    pub fn header_indices(&self, name: &str) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.eq_ignore_ascii_case(name.trim()))
            .map(|(i, _)| i)
            .collect()
    }

    /// First non-blank value of a column across all rows.
    pub fn first_value(&self, index: usize) -> Option<&str> {
        self.rows.iter().find_map(|row| row.get(index))
    }
}

/// Picks whichever of `,` `;` or tab occurs most in the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let count = |c: char| header.matches(c).count();
    [(b',', count(',')), (b';', count(';')), (b'\t', count('\t'))]
        .into_iter()
        .fold((b',', 0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
        .0
}
