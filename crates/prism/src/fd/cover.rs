//! Minimal (canonical) cover computation.

use super::closure::closure;
use super::{AttributeSet, FdStatus, FunctionalDependency};
use crate::error::{PrismError, Result};

/// Reduce a dependency set to an equivalent minimal cover.
///
/// Three steps, in this order:
///
/// 1. split every multi-attribute dependent into singleton dependents;
/// 2. left-reduce each determinant (drop attributes whose removal keeps the
///    dependent inside the reduced determinant's closure);
/// 3. drop dependencies entailed by the rest of the set.
///
/// Running the steps in a different order can leave a non-minimal result.
/// The output preserves closure behavior for every attribute set.
pub fn minimal_cover(fds: &[FunctionalDependency]) -> Result<Vec<FunctionalDependency>> {
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
    }

    // Step 1: singleton right-hand sides, deduplicated, in stable order.
    let mut work: Vec<(AttributeSet, String)> = Vec::new();
    for fd in fds {
        for attr in fd.dependent.iter() {
            let pair = (fd.determinant.clone(), attr.to_string());
            if !work.contains(&pair) {
                work.push(pair);
            }
        }
    }
    work.sort();

    // Step 2: left-reduction. The closure test runs against the whole
    // current set, including the dependency being reduced.
    for i in 0..work.len() {
        loop {
            let (det, dep) = work[i].clone();
            if det.len() <= 1 {
                break;
            }
            let mut reduced = None;
            for attr in det.iter() {
                let mut smaller = det.clone();
                smaller.remove(attr);
                let entailed = closure(&smaller, &as_fds(&work)).contains(&dep);
                if entailed {
                    reduced = Some(smaller);
                    break;
                }
            }
            match reduced {
                Some(smaller) => work[i].0 = smaller,
                None => break,
            }
        }
    }

    // Left-reduction can create duplicates; keep first occurrences.
    let mut deduped: Vec<(AttributeSet, String)> = Vec::new();
    for pair in work {
        if !deduped.contains(&pair) {
            deduped.push(pair);
        }
    }
    let mut work = deduped;
    work.sort();

    // Step 3: redundancy elimination.
    let mut i = 0;
    while i < work.len() {
        let (det, dep) = work[i].clone();
        let rest: Vec<(AttributeSet, String)> = work
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| p.clone())
            .collect();
        if closure(&det, &as_fds(&rest)).contains(&dep) {
            work.remove(i);
        } else {
            i += 1;
        }
    }

    Ok(work
        .into_iter()
        .map(|(det, dep)| {
            FunctionalDependency::new(det, AttributeSet::single(dep))
                .with_status(FdStatus::Confirmed)
        })
        .collect())
}

fn as_fds(pairs: &[(AttributeSet, String)]) -> Vec<FunctionalDependency> {
    pairs
        .iter()
        .map(|(det, dep)| {
            FunctionalDependency::new(det.clone(), AttributeSet::single(dep.clone()))
        })
        .collect()
}
