//! Attribute closure under a set of functional dependencies.

use super::{AttributeSet, FunctionalDependency};

/// Compute the closure of `attrs` under `fds`.
///
/// Fixed-point expansion: any dependency whose determinant is already
/// contained in the result contributes its dependent. Terminates because
/// the result only grows and is bounded by the total attribute count; the
/// fixed point is independent of iteration order.
pub fn closure(attrs: &AttributeSet, fds: &[FunctionalDependency]) -> AttributeSet {
    let mut result = attrs.clone();
    let mut applied = vec![false; fds.len()];

    loop {
        let mut changed = false;
        for (i, fd) in fds.iter().enumerate() {
            if applied[i] || !fd.determinant.is_subset(&result) {
                continue;
            }
            applied[i] = true;
            for attr in fd.dependent.iter() {
                if result.insert(attr) {
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    result
}

/// Whether `attrs` functionally determines every attribute in `all`.
pub fn is_superkey(attrs: &AttributeSet, all: &AttributeSet, fds: &[FunctionalDependency]) -> bool {
    closure(attrs, fds).is_superset(all)
}
