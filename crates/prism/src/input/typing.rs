//! Column profiling: scalar type inference, nullability, uniqueness.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::source::{Column, ColumnType, Dataset};

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap(), // ISO date
        Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap(), // US date
        Regex::new(r"^\d{2}-\d{2}-\d{4}$").unwrap(), // European date
        Regex::new(r"^\d{4}/\d{2}/\d{2}$").unwrap(), // Alt ISO
    ]
});

static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.+-]+@[\w-]+(\.[\w-]+)+$").unwrap());

/// Profile every column of a dataset.
pub fn profile_columns(dataset: &Dataset) -> Vec<Column> {
    (0..dataset.column_count())
        .map(|idx| profile_column(dataset, idx))
        .collect()
}

/// Profile a single column by position.
pub fn profile_column(dataset: &Dataset, index: usize) -> Column {
    let mut distinct: HashSet<&str> = HashSet::new();
    let mut non_null: Vec<&str> = Vec::new();
    let mut null_count = 0usize;
    let mut max_length = 0usize;

    for value in dataset.column_values(index) {
        if Dataset::is_null_value(value) {
            null_count += 1;
            continue;
        }
        let trimmed = value.trim();
        max_length = max_length.max(trimmed.chars().count());
        distinct.insert(trimmed);
        non_null.push(trimmed);
    }

    let mut sample_values: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for &v in &non_null {
        if sample_values.len() >= 5 {
            break;
        }
        if seen.insert(v) {
            sample_values.push(v.to_string());
        }
    }

    Column {
        name: dataset.headers[index].clone(),
        position: index,
        inferred_type: infer_type(&non_null),
        nullable: null_count > 0,
        unique: !non_null.is_empty() && distinct.len() == non_null.len(),
        distinct_count: distinct.len(),
        null_count,
        max_length,
        sample_values,
    }
}

/// Infer the most specific scalar type matching every non-null value.
fn infer_type(values: &[&str]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::Unknown;
    }

    if values.iter().all(|v| is_boolean(v)) {
        return ColumnType::Boolean;
    }

    if values
        .iter()
        .all(|v| DATE_PATTERNS.iter().any(|p| p.is_match(v)))
    {
        return ColumnType::Date;
    }

    if values.iter().all(|v| EMAIL_RE.is_match(v)) {
        return ColumnType::Email;
    }

    // Plain 5-digit runs also parse as integers; only call a column zip
    // codes when at least one value carries a leading zero or a +4 suffix.
    if values.iter().all(|v| ZIP_RE.is_match(v))
        && values.iter().any(|v| v.starts_with('0') || v.len() == 10)
    {
        return ColumnType::ZipCode;
    }

    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        return ColumnType::Integer;
    }

    if values.iter().all(|v| v.parse::<f64>().is_ok()) {
        return ColumnType::Float;
    }

    ColumnType::Text
}

fn is_boolean(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "t" | "f" | "y" | "n"
    )
}
