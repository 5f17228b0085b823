//! Lossless-join verification for binary decompositions.

use crate::fd::{closure, AttributeSet, FunctionalDependency};

/// Check that splitting a relation into `r1` and `r2` loses no information.
///
/// A binary split is lossless iff the shared attributes functionally
/// determine one of the two sides: `(R1 ∩ R2)⁺ ⊇ R1` or `(R1 ∩ R2)⁺ ⊇ R2`.
pub fn is_lossless_split(
    r1: &AttributeSet,
    r2: &AttributeSet,
    fds: &[FunctionalDependency],
) -> bool {
    let common = r1.intersection(r2);
    let reach = closure(&common, fds);
    reach.is_superset(r1) || reach.is_superset(r2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fd::test_support::{attrs, fd};

    #[test]
    fn test_split_on_determinant_is_lossless() {
        let fds = vec![fd(&["did"], &["dname"])];
        assert!(is_lossless_split(
            &attrs(&["did", "dname"]),
            &attrs(&["sid", "sname", "did"]),
            &fds
        ));
    }

    #[test]
    fn test_split_without_shared_determinant_is_lossy() {
        let fds = vec![fd(&["sid"], &["sname"])];
        // Shared attribute dname determines neither side.
        assert!(!is_lossless_split(
            &attrs(&["sid", "dname"]),
            &attrs(&["sname", "dname"]),
            &fds
        ));
    }

    #[test]
    fn test_disjoint_split_is_lossy() {
        let fds = vec![fd(&["a"], &["b"])];
        assert!(!is_lossless_split(&attrs(&["a", "b"]), &attrs(&["c"]), &fds));
    }
}
