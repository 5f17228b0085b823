//! Functional dependencies and attribute sets.

mod closure;
mod cover;
mod detect;
mod keys;

pub use closure::{closure, is_superkey};
pub use cover::minimal_cover;
pub use detect::{DetectionReport, DetectorConfig, FdDetector};
pub use keys::{infer_keys, CandidateKey};

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PrismError, Result};

/// A set of column names in canonical sorted form.
///
/// Used pervasively as determinants, dependents and keys; the sorted
/// representation makes equality, hashing and ordering stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeSet<String>);

impl AttributeSet {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Create a set holding a single attribute.
    pub fn single(name: impl Into<String>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(name.into());
        Self(set)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name)
    }

    /// Iterate attributes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    pub fn is_subset(&self, other: &AttributeSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_superset(&self, other: &AttributeSet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn is_disjoint(&self, other: &AttributeSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// True when `self` is a subset of `other` but not equal to it.
    pub fn is_proper_subset(&self, other: &AttributeSet) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    pub fn union(&self, other: &AttributeSet) -> AttributeSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &AttributeSet) -> AttributeSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &AttributeSet) -> AttributeSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    /// Attributes as an ordered vector.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<String> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| s.to_string()).collect())
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
        }
        write!(f, "}}")
    }
}

/// Review state of a detected dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FdStatus {
    /// Held exactly in the data (confidence 1.0, zero violations).
    AutoConfirmed,
    /// Held with high but imperfect confidence; awaiting a user decision.
    NeedsReview,
    /// Explicitly confirmed by the user.
    Confirmed,
    /// Explicitly rejected by the user.
    Rejected,
}

impl FdStatus {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FdStatus::AutoConfirmed => "Auto-confirmed",
            FdStatus::NeedsReview => "Needs review",
            FdStatus::Confirmed => "Confirmed",
            FdStatus::Rejected => "Rejected",
        }
    }

    /// Whether a dependency in this state feeds the decomposition algorithms.
    pub fn is_usable(&self) -> bool {
        matches!(self, FdStatus::AutoConfirmed | FdStatus::Confirmed)
    }
}

/// A functional dependency: the determinant's value fixes the dependent's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalDependency {
    /// Identifier for CLI/session reference (`fd_001`, ...). Assigned per
    /// detection run; empty on derived dependencies (e.g. cover members).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Left-hand side.
    pub determinant: AttributeSet,
    /// Right-hand side; disjoint from the determinant.
    pub dependent: AttributeSet,
    /// Fraction of determinant groups with a single dependent value.
    pub confidence: f64,
    /// Number of determinant groups with more than one dependent value.
    pub violation_count: usize,
    /// Number of distinct determinant groups measured.
    pub support: usize,
    /// Review state.
    pub status: FdStatus,
}

impl FunctionalDependency {
    /// Create an exact dependency (confidence 1.0, auto-confirmed).
    pub fn new(determinant: AttributeSet, dependent: AttributeSet) -> Self {
        Self {
            id: String::new(),
            determinant,
            dependent,
            confidence: 1.0,
            violation_count: 0,
            support: 0,
            status: FdStatus::AutoConfirmed,
        }
    }

    /// Set measured statistics; anything below exact becomes `NeedsReview`.
    pub fn with_measurement(mut self, confidence: f64, violation_count: usize, support: usize) -> Self {
        self.confidence = confidence;
        self.violation_count = violation_count;
        self.support = support;
        self.status = if violation_count == 0 && confidence >= 1.0 {
            FdStatus::AutoConfirmed
        } else {
            FdStatus::NeedsReview
        };
        self
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the review state.
    pub fn with_status(mut self, status: FdStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether this dependency feeds the decomposition algorithms.
    pub fn is_usable(&self) -> bool {
        self.status.is_usable()
    }

    /// Whether another dependency has the same determinant and dependent.
    pub fn same_dependency(&self, other: &FunctionalDependency) -> bool {
        self.determinant == other.determinant && self.dependent == other.dependent
    }
}

impl fmt::Display for FunctionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.determinant, self.dependent)
    }
}

/// Reject dependency sets the algorithms cannot process: empty sides,
/// determinant/dependent overlap, or references to unknown columns.
pub fn validate_dependencies(
    fds: &[FunctionalDependency],
    attributes: &AttributeSet,
) -> Result<()> {
    for fd in fds {
        if fd.determinant.is_empty() || fd.dependent.is_empty() {
            return Err(PrismError::InvalidDependencySet(format!(
                "dependency '{}' has an empty side",
                fd
            )));
        }
        if !fd.determinant.is_disjoint(&fd.dependent) {
            return Err(PrismError::InvalidDependencySet(format!(
                "dependency '{}' has overlapping determinant and dependent",
                fd
            )));
        }
        for attr in fd.determinant.iter().chain(fd.dependent.iter()) {
            if !attributes.contains(attr) {
                return Err(PrismError::InvalidDependencySet(format!(
                    "dependency '{}' references unknown column '{}'",
                    fd, attr
                )));
            }
        }
    }
    Ok(())
}
