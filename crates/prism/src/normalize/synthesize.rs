//! 3NF synthesis from a minimal cover.

use std::collections::BTreeMap;

use super::NormalForm;
use crate::error::Result;
use crate::fd::{
    closure, infer_keys, validate_dependencies, AttributeSet, CandidateKey, FunctionalDependency,
};
use crate::plan::{finalize_relations, DecompositionPlan, RelationSchema};

/// Build a dependency-preserving, lossless 3NF decomposition.
///
/// One relation per distinct determinant of the cover (determinant plus all
/// its dependents), relations with identical attribute sets merged. If no
/// relation's attribute set is a superkey of the original relation, a
/// relation holding one full candidate key is added; attributes untouched
/// by any dependency attach to that key relation so every original column
/// is owned exactly once.
pub fn synthesize_3nf(
    cover: &[FunctionalDependency],
    keys: &[CandidateKey],
    attributes: &AttributeSet,
) -> Result<DecompositionPlan> {
    validate_dependencies(cover, attributes)?;

    // Group the cover by determinant; BTreeMap keeps the output order
    // stable regardless of input order.
    let mut groups: BTreeMap<AttributeSet, (AttributeSet, Vec<FunctionalDependency>)> =
        BTreeMap::new();
    for fd in cover {
        let entry = groups
            .entry(fd.determinant.clone())
            .or_insert_with(|| (AttributeSet::new(), Vec::new()));
        entry.0 = entry.0.union(&fd.dependent);
        entry.1.push(fd.clone());
    }

    // One draft relation per determinant, merging identical attribute sets.
    let mut drafts: Vec<(AttributeSet, AttributeSet, Vec<FunctionalDependency>)> = Vec::new();
    for (det, (deps, fds)) in groups {
        let columns = det.union(&deps);
        match drafts.iter_mut().find(|(c, _, _)| *c == columns) {
            Some(existing) => existing.2.extend(fds),
            None => drafts.push((columns, det, fds)),
        }
    }

    // Ensure some relation spans a candidate key of the whole relation.
    let has_superkey = drafts
        .iter()
        .any(|(c, _, _)| closure(c, cover).is_superset(attributes));
    let anchor = if has_superkey {
        None
    } else {
        let key = keys
            .iter()
            .find(|k| closure(k, cover).is_superset(attributes))
            .cloned()
            .or_else(|| infer_keys(attributes, cover).into_iter().next())
            .unwrap_or_else(|| attributes.clone());
        drafts.push((key.clone(), key, Vec::new()));
        Some(drafts.len() - 1)
    };

    // Ownership rule: columns no dependency touches still need a home.
    let mut covered = AttributeSet::new();
    for (columns, _, _) in &drafts {
        covered = covered.union(columns);
    }
    let uncovered = attributes.difference(&covered);
    if !uncovered.is_empty() {
        let idx = anchor.unwrap_or(0);
        drafts[idx].0 = drafts[idx].0.union(&uncovered);
    }

    let mut relations: Vec<RelationSchema> = drafts
        .into_iter()
        .map(|(columns, pk, fds)| RelationSchema::new(&columns, pk, fds))
        .collect();
    finalize_relations(&mut relations, attributes, cover);

    let mut plan = DecompositionPlan::new(NormalForm::Third, attributes);
    plan.relations = relations;
    Ok(plan)
}
