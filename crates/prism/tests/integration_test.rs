//! Integration tests for Prism.

use std::collections::HashSet;
use std::io::Write;

use tempfile::NamedTempFile;

use prism::{
    apply_plan, assess_normal_form, closure, decompose_bcnf, infer_keys, minimal_cover,
    synthesize_3nf, AttributeSet, ColumnType, Dataset, DecompositionPlan, FdStatus,
    FunctionalDependency, NormalForm, Prism, PrismError, TransformEngine,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn attrs(names: &[&str]) -> AttributeSet {
    names.iter().copied().collect()
}

fn fd(det: &[&str], dep: &[&str]) -> FunctionalDependency {
    FunctionalDependency::new(det.iter().copied().collect(), dep.iter().copied().collect())
}

// =============================================================================
// Worked example: students and departments
// =============================================================================

fn student_fds() -> Vec<FunctionalDependency> {
    vec![
        fd(&["sid"], &["sname"]),
        fd(&["sid"], &["did"]),
        fd(&["did"], &["dname"]),
    ]
}

#[test]
fn test_worked_example_minimal_cover_is_stable() {
    let cover = minimal_cover(&student_fds()).expect("cover");
    assert_eq!(cover.len(), 3);

    let pairs: HashSet<(AttributeSet, AttributeSet)> = cover
        .into_iter()
        .map(|f| (f.determinant, f.dependent))
        .collect();
    assert!(pairs.contains(&(attrs(&["sid"]), attrs(&["sname"]))));
    assert!(pairs.contains(&(attrs(&["sid"]), attrs(&["did"]))));
    assert!(pairs.contains(&(attrs(&["did"]), attrs(&["dname"]))));
}

#[test]
fn test_worked_example_both_targets_agree() {
    let all = attrs(&["sid", "sname", "did", "dname"]);
    let cover = minimal_cover(&student_fds()).unwrap();
    let keys = infer_keys(&all, &cover);
    assert_eq!(keys, vec![attrs(&["sid"])]);

    let third = synthesize_3nf(&cover, &keys, &all).unwrap();
    let bcnf = decompose_bcnf(&all, &cover).unwrap();

    let third_sets: HashSet<AttributeSet> =
        third.relations.iter().map(|r| r.attribute_set()).collect();
    let bcnf_sets: HashSet<AttributeSet> =
        bcnf.relations.iter().map(|r| r.attribute_set()).collect();

    let expected: HashSet<AttributeSet> = [
        attrs(&["sid", "sname", "did"]),
        attrs(&["did", "dname"]),
    ]
    .into_iter()
    .collect();

    assert_eq!(third_sets, expected);
    assert_eq!(bcnf_sets, expected);
    assert!(third.unenforced_dependencies.is_empty());
    assert!(bcnf.unenforced_dependencies.is_empty());
}

#[test]
fn test_worked_example_join_reconstructs_original() {
    let all = attrs(&["sid", "sname", "did", "dname"]);
    let cover = minimal_cover(&student_fds()).unwrap();
    let keys = infer_keys(&all, &cover);
    let plan = synthesize_3nf(&cover, &keys, &all).unwrap();

    let data = Dataset::new(
        vec!["sid".into(), "sname".into(), "did".into(), "dname".into()],
        vec![
            vec!["s1".into(), "Ada".into(), "d1".into(), "Math".into()],
            vec!["s2".into(), "Alan".into(), "d1".into(), "Math".into()],
            vec!["s3".into(), "Grace".into(), "d2".into(), "CS".into()],
        ],
    );

    let tables = apply_plan(&plan, &data, true).unwrap();

    // Natural join of the two relations on did.
    let students = tables
        .values()
        .find(|t| t.headers.contains(&"sname".to_string()))
        .unwrap();
    let depts = tables
        .values()
        .find(|t| t.headers.contains(&"dname".to_string()))
        .unwrap();

    let s_did = students.column_index("did").unwrap();
    let d_did = depts.column_index("did").unwrap();
    let d_name = depts.column_index("dname").unwrap();

    let mut joined: HashSet<(String, String, String, String)> = HashSet::new();
    for srow in &students.rows {
        for drow in &depts.rows {
            if srow[s_did] == drow[d_did] {
                joined.insert((
                    srow[students.column_index("sid").unwrap()].clone(),
                    srow[students.column_index("sname").unwrap()].clone(),
                    srow[s_did].clone(),
                    drow[d_name].clone(),
                ));
            }
        }
    }

    let original: HashSet<(String, String, String, String)> = data
        .rows
        .iter()
        .map(|r| (r[0].clone(), r[1].clone(), r[2].clone(), r[3].clone()))
        .collect();

    // No spurious and no missing tuples.
    assert_eq!(joined, original);
}

// =============================================================================
// End-to-end: analyze a file, review, normalize, apply
// =============================================================================

#[test]
fn test_full_pipeline_on_enrollment_data() {
    // sid repeats, so it is a determinant candidate rather than a unique
    // column; the data is consistent with sid → sname, did and did → dname.
    let content = "sid,sname,did,dname\n\
                   s1,Ada,d1,Math\n\
                   s1,Ada,d1,Math\n\
                   s2,Alan,d1,Math\n\
                   s3,Grace,d2,CS\n";
    let file = create_test_file(content);

    let session = Prism::new().analyze(file.path()).unwrap();
    assert_eq!(session.source.format, "csv");
    assert_eq!(session.source.column_count, 4);

    // Everything here is exact, so nothing waits for review.
    assert!(session.is_complete());
    let usable = session.normalization_dependencies();
    assert!(usable
        .iter()
        .any(|f| f.determinant == attrs(&["did"]) && f.dependent == attrs(&["dname"])));

    let all = session.attribute_set();
    let cover = minimal_cover(&usable).unwrap();
    let plan = synthesize_3nf(&cover, &session.keys, &all).unwrap();

    // Ownership: every original column appears in some relation.
    let owned: AttributeSet = plan
        .relations
        .iter()
        .flat_map(|r| r.columns.iter().map(|s| s.as_str()))
        .collect();
    assert_eq!(owned, all);
    assert!(plan.relations.iter().any(|r| r.key_relation));

    // Apply back to the analyzed file's own data.
    let (dataset, _) = prism::Parser::new().parse_file(file.path()).unwrap();
    let outcome = TransformEngine::new().apply(&plan, &dataset, true).unwrap();
    assert!(outcome.skipped.is_empty());

    // The department relation deduplicated to two rows.
    let dept = outcome
        .tables
        .values()
        .find(|t| t.headers.contains(&"dname".to_string()) && t.column_count() == 2)
        .expect("department relation");
    assert_eq!(dept.row_count(), 2);
}

#[test]
fn test_review_band_confidence_is_literal() {
    // 800 zip groups, 15 of them with two cities: confidence 0.98125.
    let mut content = String::from("zip,city\n");
    for i in 0..800 {
        content.push_str(&format!("{:05},city{}\n", 10000 + i, i));
    }
    for i in 0..15 {
        content.push_str(&format!("{:05},elsewhere{}\n", 10000 + i, i));
    }
    let file = create_test_file(&content);

    let session = Prism::new().analyze(file.path()).unwrap();
    let zip_city = session
        .dependencies
        .iter()
        .find(|f| f.determinant == attrs(&["zip"]) && f.dependent == attrs(&["city"]))
        .expect("zip → city candidate");

    assert_eq!(zip_city.status, FdStatus::NeedsReview);
    assert_eq!(zip_city.violation_count, 15);
    assert_eq!(zip_city.support, 800);
    assert!((zip_city.confidence - 0.98125).abs() < 1e-9);

    // Never silently promoted: it stays out of the usable set until the
    // caller confirms it.
    assert!(!session
        .usable_dependencies()
        .iter()
        .any(|f| f.determinant == attrs(&["zip"]) && f.dependent == attrs(&["city"])));
}

#[test]
fn test_confirming_review_dependency_changes_decomposition() {
    let mut content = String::from("zip,city,state\n");
    for i in 0..40 {
        // Two zips per state, consistent city per zip except one clash.
        content.push_str(&format!("{:05},city{},st{}\n", 20000 + i, i, i / 2));
    }
    content.push_str("20000,oddball,st0\n");
    let file = create_test_file(&content);

    let mut session = Prism::new().analyze(file.path()).unwrap();
    let pending_ids: Vec<String> = session.pending().iter().map(|f| f.id.clone()).collect();
    assert!(!pending_ids.is_empty());

    for id in &pending_ids {
        session.confirm(id).unwrap();
    }
    assert!(session.is_complete());

    let all = session.attribute_set();
    let cover = minimal_cover(&session.normalization_dependencies()).unwrap();
    let plan = synthesize_3nf(&cover, &session.keys, &all).unwrap();
    assert!(plan.relations.len() >= 2);
}

// =============================================================================
// BCNF dependency loss
// =============================================================================

#[test]
fn test_bcnf_reports_unenforceable_dependencies() {
    let all = attrs(&["street", "city", "zip"]);
    let cover = minimal_cover(&[
        fd(&["street", "city"], &["zip"]),
        fd(&["zip"], &["city"]),
    ])
    .unwrap();

    let plan = decompose_bcnf(&all, &cover).unwrap();
    assert_eq!(plan.target, NormalForm::Bcnf);
    assert_eq!(plan.unenforced_dependencies.len(), 1);
    assert_eq!(
        plan.unenforced_dependencies[0].determinant,
        attrs(&["city", "street"])
    );

    // 3NF synthesis of the same input keeps every dependency enforceable.
    let keys = infer_keys(&all, &cover);
    let third = synthesize_3nf(&cover, &keys, &all).unwrap();
    assert!(third.unenforced_dependencies.is_empty());
    for f in &cover {
        let span = f.determinant.union(&f.dependent);
        assert!(
            third
                .relations
                .iter()
                .any(|r| span.is_subset(&r.attribute_set())),
            "{} not expressible in any relation",
            f
        );
    }
}

// =============================================================================
// Transform failure modes
// =============================================================================

fn customer_plan() -> DecompositionPlan {
    let all = attrs(&["order_id", "customer_id", "customer_name", "amount"]);
    let cover = minimal_cover(&[
        fd(&["order_id"], &["customer_id"]),
        fd(&["order_id"], &["amount"]),
        fd(&["customer_id"], &["customer_name"]),
    ])
    .unwrap();
    let keys = infer_keys(&all, &cover);
    synthesize_3nf(&cover, &keys, &all).unwrap()
}

#[test]
fn test_missing_column_strict_vs_lenient() {
    let plan = customer_plan();

    // New data lacking customer_name, which only the customer relation uses.
    let data = Dataset::new(
        vec!["order_id".into(), "customer_id".into(), "amount".into()],
        vec![
            vec!["o1".into(), "c1".into(), "10".into()],
            vec!["o2".into(), "c1".into(), "20".into()],
        ],
    );

    // Strict: fails immediately, nothing produced.
    let err = TransformEngine::new().apply(&plan, &data, true).unwrap_err();
    match err {
        PrismError::SchemaMismatch { missing } => {
            assert_eq!(missing, vec!["customer_name".to_string()])
        }
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }

    // Non-strict: the optional customer relation is skipped, the rest are
    // still produced.
    let outcome = TransformEngine::new().apply(&plan, &data, false).unwrap();
    assert_eq!(outcome.skipped.len(), 1);
    assert!(!outcome.tables.is_empty());
}

#[test]
fn test_transform_idempotence() {
    let plan = customer_plan();
    let data = Dataset::new(
        vec![
            "order_id".into(),
            "customer_id".into(),
            "customer_name".into(),
            "amount".into(),
        ],
        vec![
            vec!["o2".into(), "c1".into(), "Ada".into(), "20".into()],
            vec!["o1".into(), "c1".into(), "Ada".into(), "10".into()],
            vec!["o1".into(), "c1".into(), "Ada".into(), "10".into()],
        ],
    );

    let first = apply_plan(&plan, &data, true).unwrap();
    let second = apply_plan(&plan, &data, true).unwrap();
    assert_eq!(first, second);

    // Duplicated source rows collapse.
    for table in first.values() {
        let unique: HashSet<&Vec<String>> = table.rows.iter().collect();
        assert_eq!(unique.len(), table.row_count());
    }
}

// =============================================================================
// Plan persistence round trip
// =============================================================================

#[test]
fn test_plan_round_trip_preserves_behavior() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.json");

    let plan = customer_plan();
    plan.save(&path).unwrap();
    let loaded = DecompositionPlan::load(&path).unwrap();
    assert_eq!(plan, loaded);

    let data = Dataset::new(
        vec![
            "order_id".into(),
            "customer_id".into(),
            "customer_name".into(),
            "amount".into(),
        ],
        vec![vec!["o1".into(), "c1".into(), "Ada".into(), "10".into()]],
    );
    assert_eq!(
        apply_plan(&plan, &data, true).unwrap(),
        apply_plan(&loaded, &data, true).unwrap()
    );
}

// =============================================================================
// Assessment and typing round out the pipeline
// =============================================================================

#[test]
fn test_assessment_matches_decomposition_need() {
    let all = attrs(&["sid", "sname", "did", "dname"]);
    let fds = student_fds();
    let keys = infer_keys(&all, &fds);

    let report = assess_normal_form(&all, &fds, &keys);
    assert_eq!(report.classification, NormalForm::Second);

    // Decomposing and re-assessing each relation reaches BCNF.
    let cover = minimal_cover(&fds).unwrap();
    let plan = decompose_bcnf(&all, &cover).unwrap();
    for rel in &plan.relations {
        let set = rel.attribute_set();
        let rel_keys = infer_keys(&set, &rel.dependencies);
        let rel_report = assess_normal_form(&set, &rel.dependencies, &rel_keys);
        assert_eq!(rel_report.classification, NormalForm::Bcnf);
    }
}

#[test]
fn test_column_typing_via_analysis() {
    let content = "id,amount,signup,contact\n\
                   1,10.5,2024-01-01,a@example.com\n\
                   2,11.0,2024-02-01,b@example.com\n\
                   3,12.25,2024-03-01,c@example.com\n";
    let file = create_test_file(content);

    let session = Prism::new().analyze(file.path()).unwrap();
    let types: Vec<ColumnType> = session.columns.iter().map(|c| c.inferred_type).collect();
    assert_eq!(
        types,
        vec![
            ColumnType::Integer,
            ColumnType::Float,
            ColumnType::Date,
            ColumnType::Email
        ]
    );
}

#[test]
fn test_closure_exposed_at_crate_root() {
    let fds = student_fds();
    let reach = closure(&attrs(&["sid"]), &fds);
    assert_eq!(reach, attrs(&["sid", "sname", "did", "dname"]));
}
