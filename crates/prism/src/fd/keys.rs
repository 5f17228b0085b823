//! Candidate-key inference from confirmed dependencies.

use super::closure::closure;
use super::{AttributeSet, FunctionalDependency};

/// A minimal attribute set whose closure is the full relation.
pub type CandidateKey = AttributeSet;

/// Find all minimal candidate keys of `attributes` under `fds`.
///
/// Attributes that never appear on a right-hand side must be part of every
/// key. If their closure already covers the relation they form the unique
/// minimal key; otherwise the seed is extended breadth-first, smallest
/// extension count first, skipping supersets of keys already found.
///
/// Returns an empty list when no dependencies are given: with nothing known,
/// "the whole row" is the only safe key and that choice belongs to the
/// caller.
pub fn infer_keys(attributes: &AttributeSet, fds: &[FunctionalDependency]) -> Vec<CandidateKey> {
    if fds.is_empty() || attributes.is_empty() {
        return Vec::new();
    }

    let mut in_dependent = AttributeSet::new();
    for fd in fds {
        in_dependent = in_dependent.union(&fd.dependent);
    }
    let seed = attributes.difference(&in_dependent);

    if closure(&seed, fds).is_superset(attributes) {
        return vec![minimize(&seed, attributes, fds)];
    }

    let extension_pool: Vec<String> = attributes.difference(&seed).to_vec();
    let mut keys: Vec<CandidateKey> = Vec::new();

    for size in 1..=extension_pool.len() {
        for combo in combinations(&extension_pool, size) {
            let mut candidate = seed.clone();
            for attr in combo {
                candidate.insert(attr);
            }
            if keys.iter().any(|k| k.is_subset(&candidate)) {
                continue;
            }
            if closure(&candidate, fds).is_superset(attributes) {
                let minimal = minimize(&candidate, attributes, fds);
                if !keys.iter().any(|k| k.is_subset(&minimal)) {
                    keys.push(minimal);
                }
            }
        }
    }

    keys.sort();
    keys
}

/// Drop attributes whose removal keeps the closure full.
fn minimize(
    candidate: &AttributeSet,
    attributes: &AttributeSet,
    fds: &[FunctionalDependency],
) -> AttributeSet {
    let mut result = candidate.clone();
    loop {
        let mut removed = None;
        for attr in result.iter() {
            let mut smaller = result.clone();
            smaller.remove(attr);
            if closure(&smaller, fds).is_superset(attributes) {
                removed = Some(smaller);
                break;
            }
        }
        match removed {
            Some(smaller) => result = smaller,
            None => return result,
        }
    }
}

/// All k-element subsets of `items`, in positional order.
fn combinations(items: &[String], k: usize) -> Vec<Vec<String>> {
    let mut result = Vec::new();
    if k == 0 || k > items.len() {
        return result;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        result.push(indices.iter().map(|&i| items[i].clone()).collect());

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
