//! CLI command implementations.

pub mod analyze;
pub mod apply;
pub mod batch;
pub mod normalize;
pub mod review;
pub mod status;

use std::path::{Path, PathBuf};

use prism::{analysis_path, Dataset};

/// Resolve a user-supplied path to the analysis session file: JSON files
/// are taken as-is, data files map to their `<stem>.analysis.json` sibling.
pub fn resolve_session_path(file: &Path) -> PathBuf {
    if file.extension().map(|e| e == "json").unwrap_or(false) {
        file.to_path_buf()
    } else {
        analysis_path(file)
    }
}

/// Write a dataset as a CSV file.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&dataset.headers)?;
    for row in &dataset.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
