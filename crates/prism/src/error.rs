//! Error types for the Prism library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Prism operations.
#[derive(Debug, Error)]
pub enum PrismError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A plan references columns the new dataset does not provide.
    #[error("Schema mismatch: missing columns {missing:?}")]
    SchemaMismatch { missing: Vec<String> },

    /// Referential integrity violated while applying a plan.
    #[error(
        "Orphan foreign key in relation '{relation}' ({columns:?}): \
         values not present in parent key: {values:?}"
    )]
    OrphanForeignKey {
        relation: String,
        columns: Vec<String>,
        values: Vec<String>,
    },

    /// Caller supplied a dependency set that cannot be processed.
    #[error("Invalid dependency set: {0}")]
    InvalidDependencySet(String),

    /// An algorithm invariant failed; indicates a defect, not bad data.
    #[error("Internal invariant violation: {0}")]
    InternalInvariantViolation(String),

    /// Error saving or loading persisted state.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A dependency id that does not exist in the session.
    #[error("Unknown dependency: {0}")]
    UnknownDependency(String),
}

/// Result type alias for Prism operations.
pub type Result<T> = std::result::Result<T, PrismError>;
