//! Prism: relational schema inference and normalization for flat datasets.
//!
//! Prism takes a denormalized tabular dataset, discovers the functional
//! dependencies hiding in it, and decomposes it into a normalized schema
//! (3NF or BCNF) with keys and foreign keys.
//!
//! # Core Principles
//!
//! - **Evidence-driven**: dependencies are proposed from data patterns with
//!   an explicit confidence; anything below certainty needs a human decision
//! - **Non-destructive**: the original data is never modified; decomposition
//!   produces new derived tables
//! - **Reproducible**: detection, synthesis and decomposition are
//!   deterministic, so the same input always yields the same plan
//!
//! # Example
//!
//! ```no_run
//! use prism::{apply_plan, minimal_cover, synthesize_3nf, Prism};
//!
//! let prism = Prism::new();
//! let session = prism.analyze("orders.csv").unwrap();
//!
//! let fds = session.normalization_dependencies();
//! let cover = minimal_cover(&fds).unwrap();
//! let plan = synthesize_3nf(&cover, &session.keys, &session.attribute_set()).unwrap();
//!
//! println!("{} relations", plan.relations.len());
//! ```

pub mod error;
pub mod fd;
pub mod input;
pub mod normalize;
pub mod plan;
pub mod session;
pub mod transform;

mod prism;

pub use crate::prism::{Prism, PrismConfig};
pub use error::{PrismError, Result};
pub use fd::{
    closure, infer_keys, is_superkey, minimal_cover, validate_dependencies, AttributeSet,
    CandidateKey, DetectionReport, DetectorConfig, FdDetector, FdStatus, FunctionalDependency,
};
pub use input::{Column, ColumnType, Dataset, Parser, ParserConfig, SourceMetadata};
pub use normalize::{
    assess_normal_form, decompose_bcnf, is_lossless_split, synthesize_3nf, NormalForm,
    NormalFormReport, NormalFormViolation,
};
pub use plan::{DecompositionPlan, ForeignKey, RelationSchema};
pub use session::{analysis_path, AnalysisSession, DependencyCounts};
pub use transform::{apply_plan, ApplyOutcome, TransformEngine};
