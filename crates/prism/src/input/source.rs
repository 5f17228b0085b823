//! Dataset model and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the analysis was performed.
    pub analyzed_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been analyzed.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            analyzed_at: Utc::now(),
        }
    }
}

/// Inferred scalar type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole numbers (no decimal point).
    Integer,
    /// Floating-point numbers.
    Float,
    /// Boolean values (true/false, yes/no).
    Boolean,
    /// Calendar dates (ISO or US format).
    Date,
    /// US postal codes (5 or 5+4 digits).
    ZipCode,
    /// Email addresses.
    Email,
    /// Free text.
    Text,
    /// No non-null values to infer from.
    Unknown,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::Unknown
    }
}

/// Profile of a single column, computed once at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name (unique within the dataset).
    pub name: String,
    /// Zero-based position in the dataset.
    pub position: usize,
    /// Inferred scalar type.
    pub inferred_type: ColumnType,
    /// Whether null values are present.
    pub nullable: bool,
    /// Whether all non-null values are distinct.
    pub unique: bool,
    /// Number of distinct non-null values.
    pub distinct_count: usize,
    /// Number of null values.
    pub null_count: usize,
    /// Longest non-null value, in characters.
    pub max_length: usize,
    /// Sample of values for display.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sample_values: Vec<String>,
}

/// Parsed rectangular data.
///
/// Cells are stored as raw strings; null-ness is a property of the value
/// (see [`Dataset::is_null_value`]), so projections and re-application of a
/// plan to new data never lose the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Row data (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Create a new dataset.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a column's position by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get a cell's raw text.
    pub fn raw(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Get a cell value, with null tokens mapped to `None`.
    pub fn value(&self, row: usize, col: usize) -> Option<&str> {
        self.raw(row, col)
            .filter(|v| !Self::is_null_value(v))
    }

    /// Iterate over all raw values of a column.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Project the dataset onto a subset of its columns, in the given order.
    ///
    /// Columns not present in the dataset are silently omitted; callers that
    /// need all columns verify presence first.
    pub fn project(&self, columns: &[String]) -> Dataset {
        let indices: Vec<usize> = columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();

        let headers: Vec<String> = indices
            .iter()
            .map(|&i| self.headers[i].clone())
            .collect();

        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Dataset::new(headers, rows)
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}
