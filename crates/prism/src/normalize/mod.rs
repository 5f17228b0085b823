//! Normal-form assessment and decomposition algorithms.

mod assess;
mod bcnf;
mod lossless;
mod synthesize;

pub use assess::{assess_normal_form, NormalFormReport, NormalFormViolation};
pub use bcnf::decompose_bcnf;
pub use lossless::is_lossless_split;
pub use synthesize::synthesize_3nf;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relational normal forms, in increasing strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NormalForm {
    #[serde(rename = "1NF")]
    First,
    #[serde(rename = "2NF")]
    Second,
    #[serde(rename = "3NF")]
    Third,
    #[serde(rename = "BCNF")]
    Bcnf,
}

impl NormalForm {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            NormalForm::First => "1NF",
            NormalForm::Second => "2NF",
            NormalForm::Third => "3NF",
            NormalForm::Bcnf => "BCNF",
        }
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
