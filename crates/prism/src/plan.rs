//! Decomposition plans: output relations, keys, foreign keys, persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PrismError, Result};
use crate::fd::{closure, AttributeSet, FunctionalDependency};
use crate::normalize::NormalForm;

/// Plan format version, bumped on incompatible layout changes.
pub const PLAN_VERSION: &str = "1.0";

/// A foreign-key link from a relation to a parent relation's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing columns in the child relation.
    pub columns: Vec<String>,
    /// Name of the referenced relation.
    pub parent_relation: String,
    /// Referenced key columns in the parent.
    pub parent_key: Vec<String>,
}

/// Schema of one output relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSchema {
    /// Relation name, unique within the plan.
    pub name: String,
    /// Columns, primary key first.
    pub columns: Vec<String>,
    /// Chosen primary key.
    pub primary_key: AttributeSet,
    /// Links to parent relations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    /// Dependencies this relation expresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<FunctionalDependency>,
    /// Whether the columns form a superkey of the original relation; the
    /// relation that anchors a transform and may never be skipped.
    #[serde(default)]
    pub key_relation: bool,
}

impl RelationSchema {
    /// Build a relation from an attribute set, ordering key columns first.
    pub fn new(
        columns: &AttributeSet,
        primary_key: AttributeSet,
        dependencies: Vec<FunctionalDependency>,
    ) -> Self {
        let mut ordered = primary_key.to_vec();
        ordered.extend(columns.difference(&primary_key).to_vec());

        Self {
            name: String::new(),
            columns: ordered,
            primary_key,
            foreign_keys: Vec::new(),
            dependencies,
            key_relation: false,
        }
    }

    /// The relation's columns as an attribute set.
    pub fn attribute_set(&self) -> AttributeSet {
        self.columns.iter().map(|s| s.as_str()).collect()
    }

    /// Columns outside the primary key, in stored order.
    pub fn non_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !self.primary_key.contains(c))
            .map(|s| s.as_str())
            .collect()
    }
}

/// A complete decomposition: the normalized shape of one source dataset.
///
/// Created once per normalization run and reused by the transform applier;
/// immutable afterwards except through a new run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionPlan {
    /// Plan format version.
    pub version: String,
    /// Target normal form of the decomposition.
    pub target: NormalForm,
    /// When the plan was produced.
    pub created_at: DateTime<Utc>,
    /// Every column of the source dataset.
    pub original_columns: Vec<String>,
    /// Output relations, in deterministic order.
    pub relations: Vec<RelationSchema>,
    /// Confirmed dependencies no single output relation can enforce.
    /// Always empty for 3NF synthesis.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unenforced_dependencies: Vec<FunctionalDependency>,
}

impl DecompositionPlan {
    /// Create an empty plan for a target form.
    pub fn new(target: NormalForm, original: &AttributeSet) -> Self {
        Self {
            version: PLAN_VERSION.to_string(),
            target,
            created_at: Utc::now(),
            original_columns: original.to_vec(),
            relations: Vec::new(),
            unenforced_dependencies: Vec::new(),
        }
    }

    /// Look up a relation by name.
    pub fn relation(&self, name: &str) -> Option<&RelationSchema> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Save the plan to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    PrismError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            PrismError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| PrismError::Persistence(format!("Failed to serialize plan: {}", e)))
    }

    /// Load a plan from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            PrismError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
        })?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            PrismError::Persistence(format!("Failed to parse plan '{}': {}", path.display(), e))
        })
    }
}

/// Finish a set of freshly decomposed relations: mark superkey carriers,
/// assign unique names, and derive foreign keys.
pub(crate) fn finalize_relations(
    relations: &mut Vec<RelationSchema>,
    attributes: &AttributeSet,
    fds: &[FunctionalDependency],
) {
    for relation in relations.iter_mut() {
        relation.key_relation = closure(&relation.attribute_set(), fds).is_superset(attributes);
    }

    assign_names(relations);
    derive_foreign_keys(relations);
}

/// Name relations after what they hold, making duplicates unique.
fn assign_names(relations: &mut [RelationSchema]) {
    let mut used: Vec<String> = Vec::new();
    for relation in relations.iter_mut() {
        let base = relation_name(relation);
        let mut name = base.clone();
        let mut n = 2;
        while used.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        used.push(name.clone());
        relation.name = name;
    }
}

fn relation_name(relation: &RelationSchema) -> String {
    let key: Vec<&str> = relation.primary_key.iter().collect();
    let deps = relation.non_key_columns();

    if deps.len() == 1 {
        pluralize(deps[0])
    } else if key.len() == 1 {
        pluralize(key[0].strip_suffix("_id").unwrap_or(key[0]))
    } else {
        key.iter().take(2).copied().collect::<Vec<_>>().join("_")
    }
}

fn pluralize(word: &str) -> String {
    if word.is_empty() {
        "relation".to_string()
    } else if word.ends_with('s') {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Link every embedded parent key: wherever one relation's columns contain
/// another relation's primary key, the child references the parent.
fn derive_foreign_keys(relations: &mut [RelationSchema]) {
    let parents: Vec<(String, AttributeSet, AttributeSet)> = relations
        .iter()
        .map(|r| (r.name.clone(), r.attribute_set(), r.primary_key.clone()))
        .collect();

    for relation in relations.iter_mut() {
        let child_columns = relation.attribute_set();
        for (parent_name, parent_columns, parent_key) in &parents {
            if *parent_name == relation.name || *parent_columns == child_columns {
                continue;
            }
            if parent_key.is_subset(&child_columns) {
                relation.foreign_keys.push(ForeignKey {
                    columns: parent_key.to_vec(),
                    parent_relation: parent_name.clone(),
                    parent_key: parent_key.to_vec(),
                });
            }
        }
    }
}
