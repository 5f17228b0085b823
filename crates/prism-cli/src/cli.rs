//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prism: normalize flat tabular data into a relational schema
#[derive(Parser)]
#[command(name = "prism")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a data file: detect dependencies and assess the normal form
    Analyze {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the analysis file (default: <file>.analysis.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of columns in a determinant
        #[arg(long, default_value = "2")]
        max_arity: usize,

        /// Row count above which detection samples first
        #[arg(long, default_value = "50000")]
        sample_threshold: usize,

        /// Field delimiter (default: auto-detect)
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Interactively review dependencies that need confirmation
    Review {
        /// Path to data file or analysis file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Confirm or reject pending dependencies in bulk
    Batch {
        /// Path to data file or analysis file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Confirm matching dependencies (cannot use with --reject)
        #[arg(long, conflicts_with = "reject")]
        accept: bool,

        /// Reject matching dependencies (cannot use with --accept)
        #[arg(long, conflicts_with = "accept")]
        reject: bool,

        /// Apply to all pending dependencies
        #[arg(long)]
        all: bool,

        /// Filter by determinant column name
        #[arg(long, short = 'd')]
        determinant: Option<String>,
    },

    /// Show review progress and the current normal form
    Status {
        /// Path to data file or analysis file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decompose the dataset into a normalized schema
    Normalize {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Analysis file to use (default: <file>.analysis.json)
        #[arg(short, long)]
        session: Option<PathBuf>,

        /// Target normal form
        #[arg(short, long, default_value = "3nf")]
        target: TargetForm,

        /// Output directory
        #[arg(short, long, default_value = "./normalized")]
        output_dir: PathBuf,
    },

    /// Apply a saved plan to new, structurally identical data
    Apply {
        /// Path to the new data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Plan file produced by `prism normalize`
        #[arg(short, long)]
        plan: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,

        /// Fail on any missing column instead of skipping relations
        #[arg(long)]
        strict: bool,
    },
}

/// Target normal form for decomposition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetForm {
    /// Dependency-preserving synthesis
    #[default]
    Third,
    /// Anomaly-free splitting, possibly losing dependencies
    Bcnf,
}

impl std::str::FromStr for TargetForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "3nf" | "3" | "third" => Ok(TargetForm::Third),
            "bcnf" | "bc" => Ok(TargetForm::Bcnf),
            _ => Err(format!("Unknown target: {}. Use 3nf or bcnf.", s)),
        }
    }
}

impl std::fmt::Display for TargetForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetForm::Third => write!(f, "3nf"),
            TargetForm::Bcnf => write!(f, "bcnf"),
        }
    }
}
