//! Candidate functional-dependency detection over a dataset.

use std::collections::{HashMap, HashSet};

use super::{AttributeSet, FunctionalDependency};
use crate::input::Dataset;

/// Detector configuration.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Maximum number of attributes in a determinant.
    pub max_arity: usize,
    /// Row count above which detection runs on a sample first.
    pub sample_threshold: usize,
    /// Seed for the reproducible sample.
    pub sample_seed: u64,
    /// Hard confidence cutoff; candidates below it are discarded.
    pub review_floor: f64,
    /// Minimum number of determinant groups for a candidate to count.
    pub min_support: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_arity: 2,
            sample_threshold: 50_000,
            sample_seed: 42,
            review_floor: 0.95,
            min_support: 1,
        }
    }
}

/// Result of a detection run.
#[derive(Debug, Clone)]
pub struct DetectionReport {
    /// Candidates, sorted by (determinant, dependent). Statuses are
    /// `auto_confirmed` or `needs_review`, never `confirmed`.
    pub dependencies: Vec<FunctionalDependency>,
    /// Columns whose distinct count equals the row count. Reported once as
    /// key candidates rather than as a dependency to every other column.
    pub unique_columns: Vec<String>,
    /// Whether the first pass ran on a sample.
    pub sampled: bool,
    /// Rows scanned in the first pass.
    pub rows_scanned: usize,
}

/// Scans column subsets of a dataset for candidate dependencies.
pub struct FdDetector {
    config: DetectorConfig,
}

impl FdDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Detect candidate dependencies.
    ///
    /// Rows with a null in the determinant or dependent are excluded from
    /// grouping; nulls never support or refute a dependency. Confidence is
    /// `1 - violating_groups / total_groups`. Above the sampling threshold
    /// the scan runs on a seeded sample and every surviving candidate is
    /// re-measured against the full dataset before a status is assigned, so
    /// `auto_confirmed` always reflects full-data truth.
    pub fn detect(&self, dataset: &Dataset) -> DetectionReport {
        let row_count = dataset.row_count();

        // Column order by name keeps enumeration independent of file layout.
        let mut by_name: Vec<usize> = (0..dataset.column_count()).collect();
        by_name.sort_by(|&a, &b| dataset.headers[a].cmp(&dataset.headers[b]));

        let unique_cols: Vec<usize> = by_name
            .iter()
            .copied()
            .filter(|&c| is_unique_column(dataset, c))
            .collect();
        let unique_set: HashSet<usize> = unique_cols.iter().copied().collect();

        let determinant_cols: Vec<usize> = by_name
            .iter()
            .copied()
            .filter(|c| !unique_set.contains(c))
            .collect();

        let sampled = row_count > self.config.sample_threshold;
        let rows: Vec<usize> = if sampled {
            sample_indices(row_count, self.config.sample_threshold, self.config.sample_seed)
        } else {
            (0..row_count).collect()
        };
        let rows_scanned = rows.len();

        // First pass: enumerate determinant subsets, smallest arity first so
        // exact smaller determinants prune their supersets.
        let mut candidates: Vec<(Vec<usize>, usize, Measurement)> = Vec::new();
        let mut exact_dets: HashMap<usize, Vec<HashSet<usize>>> = HashMap::new();

        for arity in 1..=self.config.max_arity.max(1) {
            for combo in combinations(&determinant_cols, arity) {
                let combo_set: HashSet<usize> = combo.iter().copied().collect();
                for &dep in &by_name {
                    if combo_set.contains(&dep) {
                        continue;
                    }
                    if let Some(exacts) = exact_dets.get(&dep) {
                        if exacts.iter().any(|e| e.is_subset(&combo_set)) {
                            continue;
                        }
                    }
                    let Some(m) = measure(dataset, &rows, &combo, dep) else {
                        continue;
                    };
                    if m.group_count < self.config.min_support
                        || m.confidence < self.config.review_floor
                    {
                        continue;
                    }
                    if m.violation_count == 0 {
                        exact_dets.entry(dep).or_default().push(combo_set.clone());
                    }
                    candidates.push((combo.clone(), dep, m));
                }
            }
        }

        // Second pass: sampling never decides a reported confidence.
        if sampled {
            let all_rows: Vec<usize> = (0..row_count).collect();
            candidates = candidates
                .into_iter()
                .filter_map(|(det, dep, _)| {
                    measure(dataset, &all_rows, &det, dep)
                        .filter(|m| {
                            m.group_count >= self.config.min_support
                                && m.confidence >= self.config.review_floor
                        })
                        .map(|m| (det, dep, m))
                })
                .collect();
        }

        let mut dependencies: Vec<FunctionalDependency> = candidates
            .into_iter()
            .map(|(det, dep, m)| {
                let determinant: AttributeSet = det
                    .iter()
                    .map(|&c| dataset.headers[c].as_str())
                    .collect();
                let dependent = AttributeSet::single(dataset.headers[dep].clone());
                FunctionalDependency::new(determinant, dependent).with_measurement(
                    m.confidence,
                    m.violation_count,
                    m.group_count,
                )
            })
            .collect();

        // Deterministic merge order, per the parallel-scan contract.
        dependencies.sort_by(|a, b| {
            (&a.determinant, &a.dependent).cmp(&(&b.determinant, &b.dependent))
        });
        for (i, fd) in dependencies.iter_mut().enumerate() {
            fd.id = format!("fd_{:03}", i + 1);
        }

        let unique_columns: Vec<String> = unique_cols
            .iter()
            .map(|&c| dataset.headers[c].clone())
            .collect();

        DetectionReport {
            dependencies,
            unique_columns,
            sampled,
            rows_scanned,
        }
    }
}

impl Default for FdDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
struct Measurement {
    confidence: f64,
    violation_count: usize,
    group_count: usize,
}

/// Group the given rows by the determinant columns and count groups whose
/// dependent value is not constant. Returns `None` when no row survives
/// null exclusion.
fn measure(dataset: &Dataset, rows: &[usize], det: &[usize], dep: usize) -> Option<Measurement> {
    // Per group: first dependent value seen, and whether a second one showed up.
    let mut groups: HashMap<Vec<&str>, (&str, bool)> = HashMap::new();

    'rows: for &r in rows {
        let mut key = Vec::with_capacity(det.len());
        for &c in det {
            match dataset.value(r, c) {
                Some(v) => key.push(v),
                None => continue 'rows,
            }
        }
        let y = match dataset.value(r, dep) {
            Some(v) => v,
            None => continue,
        };
        match groups.get_mut(&key) {
            Some((first, violated)) => {
                if !*violated && *first != y {
                    *violated = true;
                }
            }
            None => {
                groups.insert(key, (y, false));
            }
        }
    }

    let group_count = groups.len();
    if group_count == 0 {
        return None;
    }
    let violation_count = groups.values().filter(|(_, v)| *v).count();

    Some(Measurement {
        confidence: 1.0 - violation_count as f64 / group_count as f64,
        violation_count,
        group_count,
    })
}

fn is_unique_column(dataset: &Dataset, col: usize) -> bool {
    let mut seen = HashSet::new();
    for row in 0..dataset.row_count() {
        match dataset.value(row, col) {
            Some(v) => {
                if !seen.insert(v) {
                    return false;
                }
            }
            None => return false,
        }
    }
    dataset.row_count() > 0
}

/// Deterministic k-row sample: partial Fisher-Yates with a fixed seed,
/// returned in ascending row order.
fn sample_indices(n: usize, k: usize, seed: u64) -> Vec<usize> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut idx: Vec<usize> = (0..n).collect();
    for i in 0..k.min(n) {
        let j = i + rng.usize(0..n - i);
        idx.swap(i, j);
    }
    idx.truncate(k.min(n));
    idx.sort_unstable();
    idx
}

/// All k-element subsets of `items`, in positional order.
fn combinations(items: &[usize], k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if k == 0 || k > items.len() {
        return result;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        result.push(indices.iter().map(|&i| items[i]).collect());

        // Advance to the next combination.
        let mut i = k;
        loop {
            if i == 0 {
                return result;
            }
            i -= 1;
            if indices[i] != i + items.len() - k {
                break;
            }
        }
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}
