//! CSV/TSV parser with delimiter detection.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::source::{Dataset, SourceMetadata};
use crate::error::{PrismError, Result};

/// Delimiters considered during auto-detection.
const CANDIDATE_DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Lines inspected when guessing the delimiter.
const DETECTION_LINES: usize = 10;

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses tabular data files.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and its source metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| PrismError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let hash = format!("sha256:{:x}", Sha256::digest(&contents));

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let dataset = self.parse_bytes(&contents, delimiter)?;
        let source = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            format_label(delimiter).to_string(),
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, source))
    }

    /// Parse raw bytes with a known delimiter.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            if self.config.max_rows.is_some_and(|max| rows.len() >= max) {
                break;
            }
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        if headers.is_empty() {
            let width = rows.first().map(|r| r.len()).unwrap_or(0);
            headers = (1..=width).map(|i| format!("column_{}", i)).collect();
        }
        if headers.is_empty() {
            return Err(PrismError::EmptyData("No columns found".to_string()));
        }
        if rows.is_empty() {
            return Err(PrismError::EmptyData("No data rows found".to_string()));
        }

        // Ragged rows are padded or truncated to the header width.
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }

        Ok(Dataset::new(headers, rows))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn format_label(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

/// Guess the delimiter from the first few non-empty lines.
///
/// A candidate that splits every inspected line into the same number of
/// fields wins; ties go to the candidate with more fields, with a slight
/// preference for tab since it rarely appears inside data values.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<&str> = bytes
        .split(|&b| b == b'\n')
        .map(|l| std::str::from_utf8(l).unwrap_or(""))
        .filter(|l| !l.trim().is_empty())
        .take(DETECTION_LINES)
        .collect();

    if lines.is_empty() {
        return Err(PrismError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best = (b',', (false, 0usize, false));
    for &delim in CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| quoted_field_count(line, delim))
            .collect();

        let splits = counts[0];
        if splits == 0 {
            continue;
        }
        let consistent = counts.iter().all(|&c| c == splits);

        // Rank: consistency, then split count, then the tab preference.
        let rank = (consistent, splits, delim == b'\t');
        if rank > best.1 {
            best = (delim, rank);
        }
    }

    Ok(best.0)
}

/// Count how many fields `delimiter` splits a line into, respecting quotes.
fn quoted_field_count(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut separators = 0;

    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            separators += 1;
        }
    }

    separators
}
