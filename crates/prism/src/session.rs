//! Analysis sessions: persisted detection output plus review state.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PrismError, Result};
use crate::fd::{infer_keys, AttributeSet, CandidateKey, FdStatus, FunctionalDependency};
use crate::input::{Column, SourceMetadata};
use crate::normalize::{assess_normal_form, NormalFormReport};

/// Session format version, bumped on incompatible layout changes.
pub const SESSION_VERSION: &str = "1.0";

/// Counts of dependencies by review state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyCounts {
    pub auto_confirmed: usize,
    pub needs_review: usize,
    pub confirmed: usize,
    pub rejected: usize,
}

/// Everything one analysis run produced, plus the user's review decisions.
///
/// Confirmation is an explicit state transition invoked by the caller; the
/// analysis itself never blocks on review and re-running detection never
/// silently rewrites a stored dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSession {
    /// Session format version.
    pub version: String,
    /// Metadata about the analyzed file.
    pub source: SourceMetadata,
    /// Column profiles, in file order.
    pub columns: Vec<Column>,
    /// Detected dependencies with their review state.
    pub dependencies: Vec<FunctionalDependency>,
    /// Columns whose values were distinct across every row.
    pub unique_columns: Vec<String>,
    /// Candidate keys under the currently usable dependencies.
    pub keys: Vec<CandidateKey>,
    /// Normal-form classification under the currently usable dependencies.
    pub normal_form: NormalFormReport,
    /// Whether detection ran on a sample first.
    pub sampled: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session last changed.
    pub updated_at: DateTime<Utc>,
}

impl AnalysisSession {
    /// The full attribute set of the analyzed dataset.
    pub fn attribute_set(&self) -> AttributeSet {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a dependency by id.
    pub fn dependency(&self, id: &str) -> Option<&FunctionalDependency> {
        self.dependencies.iter().find(|fd| fd.id == id)
    }

    /// Confirm a dependency by id and refresh the derived keys/assessment.
    pub fn confirm(&mut self, id: &str) -> Result<()> {
        self.transition(id, FdStatus::Confirmed)
    }

    /// Reject a dependency by id and refresh the derived keys/assessment.
    pub fn reject(&mut self, id: &str) -> Result<()> {
        self.transition(id, FdStatus::Rejected)
    }

    fn transition(&mut self, id: &str, to: FdStatus) -> Result<()> {
        let fd = self
            .dependencies
            .iter_mut()
            .find(|fd| fd.id == id)
            .ok_or_else(|| PrismError::UnknownDependency(id.to_string()))?;

        // Exact dependencies stay auto-confirmed; confirming one is a no-op.
        if !(fd.status == FdStatus::AutoConfirmed && to == FdStatus::Confirmed) {
            fd.status = to;
        }
        self.updated_at = Utc::now();
        self.recompute_derived();
        Ok(())
    }

    /// Dependencies still awaiting review.
    pub fn pending(&self) -> Vec<&FunctionalDependency> {
        self.dependencies
            .iter()
            .filter(|fd| fd.status == FdStatus::NeedsReview)
            .collect()
    }

    /// Dependencies the decomposition algorithms may consume.
    pub fn usable_dependencies(&self) -> Vec<FunctionalDependency> {
        self.dependencies
            .iter()
            .filter(|fd| fd.is_usable())
            .cloned()
            .collect()
    }

    /// Usable dependencies plus one dependency per unique column, which
    /// determines every other attribute. Detection reports unique columns
    /// once instead of as that forest; normalization needs the forest back.
    pub fn normalization_dependencies(&self) -> Vec<FunctionalDependency> {
        let all = self.attribute_set();
        let mut fds = self.usable_dependencies();
        for unique in &self.unique_columns {
            let determinant = AttributeSet::single(unique.clone());
            let dependent = all.difference(&determinant);
            if !dependent.is_empty() {
                fds.push(
                    FunctionalDependency::new(determinant, dependent)
                        .with_status(FdStatus::Confirmed),
                );
            }
        }
        fds
    }

    /// Counts by review state.
    pub fn counts(&self) -> DependencyCounts {
        let mut counts = DependencyCounts::default();
        for fd in &self.dependencies {
            match fd.status {
                FdStatus::AutoConfirmed => counts.auto_confirmed += 1,
                FdStatus::NeedsReview => counts.needs_review += 1,
                FdStatus::Confirmed => counts.confirmed += 1,
                FdStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }

    /// Fraction of reviewable dependencies that have been decided.
    pub fn progress(&self) -> f64 {
        let counts = self.counts();
        let reviewable = counts.needs_review + counts.confirmed + counts.rejected;
        if reviewable == 0 {
            1.0
        } else {
            (counts.confirmed + counts.rejected) as f64 / reviewable as f64
        }
    }

    /// Whether every reviewable dependency has been decided.
    pub fn is_complete(&self) -> bool {
        self.counts().needs_review == 0
    }

    /// Recompute candidate keys and the normal-form report from the
    /// currently usable dependencies and the recorded unique columns.
    pub fn recompute_derived(&mut self) {
        let attributes = self.attribute_set();
        let usable = self.usable_dependencies();

        let mut keys: Vec<CandidateKey> = self
            .unique_columns
            .iter()
            .map(|c| AttributeSet::single(c.clone()))
            .collect();
        keys.extend(infer_keys(&attributes, &usable));
        keys.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        let mut minimal: Vec<CandidateKey> = Vec::new();
        for key in keys {
            if !minimal.iter().any(|k| k.is_subset(&key)) {
                minimal.push(key);
            }
        }
        self.keys = minimal;

        self.normal_form = assess_normal_form(&attributes, &usable, &self.keys);
    }

    /// Save the session to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    PrismError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            PrismError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| PrismError::Persistence(format!("Failed to serialize session: {}", e)))
    }

    /// Load a session from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            PrismError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
        })?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            PrismError::Persistence(format!(
                "Failed to parse session '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

/// Generate a session file path for a data file.
///
/// # Example
///
/// ```
/// use prism::session::analysis_path;
///
/// let path = analysis_path("data/orders.csv");
/// assert_eq!(path.to_string_lossy(), "data/orders.analysis.json");
/// ```
pub fn analysis_path(data_path: impl AsRef<Path>) -> PathBuf {
    let data_path = data_path.as_ref();
    let stem = data_path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = data_path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}.analysis.json", stem))
}
