//! BCNF decomposition by recursive violation splitting.

use std::collections::VecDeque;

use super::lossless::is_lossless_split;
use super::NormalForm;
use crate::error::{PrismError, Result};
use crate::fd::{
    closure, infer_keys, validate_dependencies, AttributeSet, FunctionalDependency,
};
use crate::plan::{finalize_relations, DecompositionPlan, RelationSchema};

/// Decompose a relation until every applicable determinant is a superkey.
///
/// Splits run off an explicit work-list (a wide schema must not recurse),
/// and the violating dependency is always the first in lexicographic
/// (determinant, dependent) order, so output is reproducible. Each split
/// `R1 = X ∪ Y`, `R2 = (R − Y) ∪ X` shares X, and is verified lossless; a
/// verifier failure is an algorithm defect and aborts the run.
///
/// Unlike 3NF synthesis this does not preserve dependencies: the plan lists
/// every input dependency that no single output relation can enforce.
pub fn decompose_bcnf(
    attributes: &AttributeSet,
    fds: &[FunctionalDependency],
) -> Result<DecompositionPlan> {
    validate_dependencies(fds, attributes)?;

    let mut queue: VecDeque<AttributeSet> = VecDeque::new();
    queue.push_back(attributes.clone());
    let mut terminal: Vec<AttributeSet> = Vec::new();

    while let Some(rel) = queue.pop_front() {
        let applicable = applicable_fds(fds, &rel);

        let violation = applicable.iter().find(|fd| {
            !fd.dependent.is_subset(&fd.determinant)
                && !closure(&fd.determinant, &applicable).is_superset(&rel)
        });

        match violation {
            None => {
                if !terminal.contains(&rel) {
                    terminal.push(rel);
                }
            }
            Some(fd) => {
                let r1 = fd.determinant.union(&fd.dependent);
                let r2 = rel.difference(&fd.dependent).union(&fd.determinant);

                if !is_lossless_split(&r1, &r2, &applicable) {
                    return Err(PrismError::InternalInvariantViolation(format!(
                        "split of {} on '{}' failed the lossless-join check",
                        rel, fd
                    )));
                }

                queue.push_back(r1);
                queue.push_back(r2);
            }
        }
    }

    let mut relations: Vec<RelationSchema> = terminal
        .into_iter()
        .map(|rel| {
            let applicable = applicable_fds(fds, &rel);
            let primary_key = infer_keys(&rel, &applicable)
                .into_iter()
                .next()
                .unwrap_or_else(|| rel.clone());
            RelationSchema::new(&rel, primary_key, applicable)
        })
        .collect();
    finalize_relations(&mut relations, attributes, fds);

    let unenforced: Vec<FunctionalDependency> = fds
        .iter()
        .filter(|fd| {
            let span = fd.determinant.union(&fd.dependent);
            !relations.iter().any(|r| span.is_subset(&r.attribute_set()))
        })
        .cloned()
        .collect();

    let mut plan = DecompositionPlan::new(NormalForm::Bcnf, attributes);
    plan.relations = relations;
    plan.unenforced_dependencies = unenforced;
    Ok(plan)
}

/// Dependencies that apply to a relation: every attribute contained.
fn applicable_fds(fds: &[FunctionalDependency], rel: &AttributeSet) -> Vec<FunctionalDependency> {
    let mut result: Vec<FunctionalDependency> = fds
        .iter()
        .filter(|fd| {
            fd.determinant.is_subset(rel) && fd.dependent.is_subset(rel)
        })
        .cloned()
        .collect();
    result.sort_by(|a, b| (&a.determinant, &a.dependent).cmp(&(&b.determinant, &b.dependent)));
    result
}
