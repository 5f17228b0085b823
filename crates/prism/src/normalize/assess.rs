//! Normal-form classification and violation reporting.

use serde::{Deserialize, Serialize};

use super::NormalForm;
use crate::fd::{closure, AttributeSet, CandidateKey, FunctionalDependency};

/// A single normal-form violation, tied to the dependency that causes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalFormViolation {
    /// The normal form this violation blocks.
    pub level: NormalForm,
    /// The offending dependency.
    pub dependency: FunctionalDependency,
    /// Human-readable explanation.
    pub explanation: String,
}

/// Classification of a relation plus every violation above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalFormReport {
    /// Highest normal form with zero violations.
    pub classification: NormalForm,
    /// Violations at each level above the classification.
    pub violations: Vec<NormalFormViolation>,
}

impl NormalFormReport {
    /// Violations blocking a specific normal form.
    pub fn violations_at(&self, level: NormalForm) -> impl Iterator<Item = &NormalFormViolation> {
        self.violations.iter().filter(move |v| v.level == level)
    }
}

/// Classify the relation formed by `attributes` under confirmed `fds`.
///
/// Assessment never fails; an empty dependency set simply classifies as
/// BCNF (nothing is known that could violate anything). When no candidate
/// key is known the full attribute set stands in as the default key.
pub fn assess_normal_form(
    attributes: &AttributeSet,
    fds: &[FunctionalDependency],
    keys: &[CandidateKey],
) -> NormalFormReport {
    let default_key;
    let keys: &[CandidateKey] = if keys.is_empty() {
        default_key = [attributes.clone()];
        &default_key
    } else {
        keys
    };

    let mut prime = AttributeSet::new();
    for key in keys {
        prime = prime.union(key);
    }

    let mut ordered: Vec<&FunctionalDependency> = fds.iter().collect();
    ordered.sort_by(|a, b| (&a.determinant, &a.dependent).cmp(&(&b.determinant, &b.dependent)));

    let mut violations = Vec::new();

    for fd in ordered {
        if fd.dependent.is_subset(&fd.determinant) {
            continue;
        }
        let superkey = closure(&fd.determinant, fds).is_superset(attributes);

        // 2NF: part of a candidate key determining a non-prime attribute.
        if let Some(key) = keys.iter().find(|k| fd.determinant.is_proper_subset(k)) {
            let non_prime: Vec<&str> =
                fd.dependent.iter().filter(|a| !prime.contains(a)).collect();
            if !non_prime.is_empty() {
                violations.push(NormalFormViolation {
                    level: NormalForm::Second,
                    dependency: fd.clone(),
                    explanation: format!(
                        "Partial dependency: {} determines non-prime {:?} but is only part of candidate key {}",
                        fd.determinant, non_prime, key
                    ),
                });
            }
        }

        // 3NF: non-superkey determinant reaching a non-prime attribute that
        // no candidate key determines directly.
        if !superkey {
            let transitive: Vec<&str> = fd
                .dependent
                .iter()
                .filter(|a| !prime.contains(a) && !directly_determined_by_key(a, fds, keys))
                .collect();
            if !transitive.is_empty() {
                violations.push(NormalFormViolation {
                    level: NormalForm::Third,
                    dependency: fd.clone(),
                    explanation: format!(
                        "Transitive dependency: non-superkey {} determines non-prime {:?}",
                        fd.determinant, transitive
                    ),
                });
            }
        }

        // BCNF: any non-superkey determinant at all.
        if !superkey {
            violations.push(NormalFormViolation {
                level: NormalForm::Bcnf,
                dependency: fd.clone(),
                explanation: format!(
                    "Non-superkey determinant: {} does not determine the whole relation",
                    fd.determinant
                ),
            });
        }
    }

    let classification = if violations.iter().any(|v| v.level == NormalForm::Second) {
        NormalForm::First
    } else if violations.iter().any(|v| v.level == NormalForm::Third) {
        NormalForm::Second
    } else if violations.iter().any(|v| v.level == NormalForm::Bcnf) {
        NormalForm::Third
    } else {
        NormalForm::Bcnf
    };

    NormalFormReport {
        classification,
        violations,
    }
}

fn directly_determined_by_key(
    attr: &str,
    fds: &[FunctionalDependency],
    keys: &[CandidateKey],
) -> bool {
    fds.iter().any(|fd| {
        fd.dependent.contains(attr) && keys.iter().any(|k| *k == fd.determinant)
    })
}
