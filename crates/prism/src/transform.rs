//! Re-application of a decomposition plan to new data.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{PrismError, Result};
use crate::input::Dataset;
use crate::plan::{DecompositionPlan, ForeignKey, RelationSchema};

/// How many offending values an orphan-key error carries.
const MAX_REPORTED_ORPHANS: usize = 10;

/// Result of applying a plan to a dataset.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// Materialized relations, in plan order.
    pub tables: IndexMap<String, Dataset>,
    /// Relations skipped in non-strict mode, with their missing columns.
    pub skipped: Vec<(String, Vec<String>)>,
}

/// Applies a previously produced plan to structurally identical data.
pub struct TransformEngine;

impl TransformEngine {
    /// Create a new transform engine.
    pub fn new() -> Self {
        Self
    }

    /// Project, deduplicate and validate a new dataset against a plan.
    ///
    /// In strict mode any column the plan references but the dataset lacks
    /// raises [`PrismError::SchemaMismatch`] before anything is produced.
    /// In non-strict mode relations touching missing columns are skipped —
    /// unless the key relation itself is affected, which is always fatal.
    /// Every produced relation is row-deduplicated and sorted by primary
    /// key, and every foreign key whose parent was produced is validated;
    /// orphaned values raise [`PrismError::OrphanForeignKey`] rather than
    /// being dropped.
    pub fn apply(
        &self,
        plan: &DecompositionPlan,
        dataset: &Dataset,
        strict: bool,
    ) -> Result<ApplyOutcome> {
        let present: HashSet<&str> = dataset.headers.iter().map(|s| s.as_str()).collect();

        if strict {
            let mut missing: Vec<String> = plan
                .original_columns
                .iter()
                .filter(|c| !present.contains(c.as_str()))
                .cloned()
                .collect();
            missing.sort();
            missing.dedup();
            if !missing.is_empty() {
                return Err(PrismError::SchemaMismatch { missing });
            }
        }

        let mut tables: IndexMap<String, Dataset> = IndexMap::new();
        let mut skipped: Vec<(String, Vec<String>)> = Vec::new();

        for relation in &plan.relations {
            let missing: Vec<String> = relation
                .columns
                .iter()
                .filter(|c| !present.contains(c.as_str()))
                .cloned()
                .collect();

            if !missing.is_empty() {
                // Strict mode tolerates nothing; the key relation is never
                // optional even when lenient.
                if strict || relation.key_relation {
                    return Err(PrismError::SchemaMismatch { missing });
                }
                skipped.push((relation.name.clone(), missing));
                continue;
            }

            tables.insert(relation.name.clone(), materialize(relation, dataset));
        }

        for relation in &plan.relations {
            let Some(child) = tables.get(&relation.name) else {
                continue;
            };
            for fk in &relation.foreign_keys {
                let Some(parent) = tables.get(&fk.parent_relation) else {
                    continue;
                };
                validate_foreign_key(relation, child, parent, fk)?;
            }
        }

        Ok(ApplyOutcome { tables, skipped })
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper returning only the materialized tables.
pub fn apply_plan(
    plan: &DecompositionPlan,
    dataset: &Dataset,
    strict: bool,
) -> Result<IndexMap<String, Dataset>> {
    TransformEngine::new()
        .apply(plan, dataset, strict)
        .map(|outcome| outcome.tables)
}

/// Project onto the relation's columns, deduplicate, and sort by key.
fn materialize(relation: &RelationSchema, dataset: &Dataset) -> Dataset {
    let mut projected = dataset.project(&relation.columns);

    let key_indices: Vec<usize> = relation
        .primary_key
        .iter()
        .filter_map(|k| projected.column_index(k))
        .collect();

    projected.rows.sort_by(|a, b| {
        let ka = key_indices.iter().map(|&i| a[i].as_str());
        let kb = key_indices.iter().map(|&i| b[i].as_str());
        ka.cmp(kb).then_with(|| a.cmp(b))
    });
    projected.rows.dedup();

    projected
}

fn validate_foreign_key(
    relation: &RelationSchema,
    child: &Dataset,
    parent: &Dataset,
    fk: &ForeignKey,
) -> Result<()> {
    let child_cols: Vec<usize> = match fk
        .columns
        .iter()
        .map(|c| child.column_index(c))
        .collect::<Option<Vec<_>>>()
    {
        Some(cols) => cols,
        None => return Ok(()),
    };
    let parent_cols: Vec<usize> = match fk
        .parent_key
        .iter()
        .map(|c| parent.column_index(c))
        .collect::<Option<Vec<_>>>()
    {
        Some(cols) => cols,
        None => return Ok(()),
    };

    let parent_values: HashSet<Vec<&str>> = (0..parent.row_count())
        .filter_map(|r| {
            parent_cols
                .iter()
                .map(|&c| parent.value(r, c))
                .collect::<Option<Vec<_>>>()
        })
        .collect();

    let mut orphans: Vec<String> = Vec::new();
    let mut seen: HashSet<Vec<&str>> = HashSet::new();
    for r in 0..child.row_count() {
        // A null anywhere in the referencing tuple opts the row out.
        let Some(tuple) = child_cols
            .iter()
            .map(|&c| child.value(r, c))
            .collect::<Option<Vec<&str>>>()
        else {
            continue;
        };
        if !parent_values.contains(&tuple) && seen.insert(tuple.clone()) {
            orphans.push(display_tuple(&tuple));
        }
    }

    if orphans.is_empty() {
        return Ok(());
    }

    orphans.sort();
    orphans.truncate(MAX_REPORTED_ORPHANS);
    Err(PrismError::OrphanForeignKey {
        relation: relation.name.clone(),
        columns: fk.columns.clone(),
        values: orphans,
    })
}

fn display_tuple(tuple: &[&str]) -> String {
    if tuple.len() == 1 {
        tuple[0].to_string()
    } else {
        format!("({})", tuple.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fd::test_support::{attrs, fd};
    use crate::fd::{infer_keys, minimal_cover};
    use crate::normalize::{synthesize_3nf, NormalForm};

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    fn student_plan() -> DecompositionPlan {
        let all = attrs(&["sid", "sname", "did", "dname"]);
        let cover = minimal_cover(&[
            fd(&["sid"], &["sname"]),
            fd(&["sid"], &["did"]),
            fd(&["did"], &["dname"]),
        ])
        .unwrap();
        let keys = infer_keys(&all, &cover);
        synthesize_3nf(&cover, &keys, &all).unwrap()
    }

    fn student_data() -> Dataset {
        dataset(
            &["sid", "sname", "did", "dname"],
            &[
                &["s2", "Alan", "d1", "Math"],
                &["s1", "Ada", "d1", "Math"],
                &["s3", "Grace", "d2", "CS"],
            ],
        )
    }

    /// A hand-written plan where the child references the parent through a
    /// differently named column, the shape that can actually orphan.
    fn order_plan() -> DecompositionPlan {
        let all = attrs(&["oid", "cid", "customer_id"]);
        let mut parent =
            RelationSchema::new(&attrs(&["customer_id"]), attrs(&["customer_id"]), vec![]);
        parent.name = "customers".into();
        let mut child = RelationSchema::new(&attrs(&["oid", "cid"]), attrs(&["oid"]), vec![]);
        child.name = "orders".into();
        child.key_relation = true;
        child.foreign_keys.push(ForeignKey {
            columns: vec!["cid".into()],
            parent_relation: "customers".into(),
            parent_key: vec!["customer_id".into()],
        });

        let mut plan = DecompositionPlan::new(NormalForm::Third, &all);
        plan.relations = vec![parent, child];
        plan
    }

    #[test]
    fn test_apply_deduplicates_and_sorts_by_key() {
        let plan = student_plan();
        let outcome = TransformEngine::new()
            .apply(&plan, &student_data(), true)
            .unwrap();

        assert!(outcome.skipped.is_empty());
        let dept_name = plan
            .relations
            .iter()
            .find(|r| r.attribute_set() == attrs(&["did", "dname"]))
            .unwrap()
            .name
            .clone();
        let student_name = plan
            .relations
            .iter()
            .find(|r| r.attribute_set() == attrs(&["sid", "sname", "did"]))
            .unwrap()
            .name
            .clone();

        let dept = &outcome.tables[&dept_name];
        assert_eq!(dept.row_count(), 2);
        assert_eq!(dept.rows[0][0], "d1");
        assert_eq!(dept.rows[1][0], "d2");

        let students = &outcome.tables[&student_name];
        assert_eq!(students.row_count(), 3);
        // Sorted by sid even though the input was not.
        assert_eq!(students.rows[0][0], "s1");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let plan = student_plan();
        let data = student_data();
        let a = apply_plan(&plan, &data, true).unwrap();
        let b = apply_plan(&plan, &data, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_strict_mode_fails_on_missing_column() {
        let plan = student_plan();
        let data = dataset(&["sid", "sname", "did"], &[&["s1", "Ada", "d1"]]);
        let err = TransformEngine::new().apply(&plan, &data, true).unwrap_err();
        match err {
            PrismError::SchemaMismatch { missing } => {
                assert_eq!(missing, vec!["dname".to_string()])
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_non_strict_skips_optional_relation() {
        let plan = student_plan();
        let data = dataset(
            &["sid", "sname", "did"],
            &[&["s1", "Ada", "d1"], &["s2", "Alan", "d1"]],
        );
        let outcome = TransformEngine::new().apply(&plan, &data, false).unwrap();

        // The department relation is skipped; the student relation survives.
        assert_eq!(outcome.tables.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].1, vec!["dname".to_string()]);
    }

    #[test]
    fn test_non_strict_still_fails_when_key_relation_affected() {
        let plan = student_plan();
        let data = dataset(&["did", "dname"], &[&["d1", "Math"]]);
        let err = TransformEngine::new().apply(&plan, &data, false).unwrap_err();
        assert!(matches!(err, PrismError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_orphan_foreign_key_lists_values() {
        let plan = order_plan();
        let data = dataset(
            &["oid", "cid", "customer_id"],
            &[
                &["o1", "c1", "c1"],
                &["o2", "c9", "c1"],
                &["o3", "c9", "c1"],
            ],
        );

        let err = TransformEngine::new().apply(&plan, &data, true).unwrap_err();
        match err {
            PrismError::OrphanForeignKey {
                relation,
                columns,
                values,
            } => {
                assert_eq!(relation, "orders");
                assert_eq!(columns, vec!["cid".to_string()]);
                // Deduplicated: c9 appears twice in the data, once here.
                assert_eq!(values, vec!["c9".to_string()]);
            }
            other => panic!("expected OrphanForeignKey, got {other:?}"),
        }
    }

    #[test]
    fn test_null_foreign_key_values_opt_out() {
        let plan = order_plan();
        let data = dataset(
            &["oid", "cid", "customer_id"],
            &[&["o1", "c1", "c1"], &["o2", "NA", "c1"]],
        );
        assert!(TransformEngine::new().apply(&plan, &data, true).is_ok());
    }

    #[test]
    fn test_fk_check_skipped_when_parent_skipped() {
        let mut plan = order_plan();
        // The parent relation now needs a column the data lacks.
        plan.relations[0].columns.push("region".into());
        let data = dataset(
            &["oid", "cid", "customer_id"],
            &[&["o1", "c1", "c1"], &["o2", "c9", "c1"]],
        );

        let outcome = TransformEngine::new().apply(&plan, &data, false).unwrap();
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].0, "customers");
        assert!(outcome.tables.contains_key("orders"));
    }
}
