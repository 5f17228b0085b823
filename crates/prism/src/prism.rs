//! Main Prism struct and public API.

use std::path::Path;

use chrono::Utc;

use crate::error::Result;
use crate::fd::{DetectorConfig, FdDetector};
use crate::input::{profile_columns, Dataset, Parser, ParserConfig, SourceMetadata};
use crate::normalize::{NormalFormReport, NormalForm};
use crate::session::{AnalysisSession, SESSION_VERSION};

/// Configuration for a Prism analysis run.
#[derive(Debug, Clone, Default)]
pub struct PrismConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Detector configuration.
    pub detector: DetectorConfig,
}

/// The main analysis engine.
///
/// # Example
///
/// ```no_run
/// use prism::Prism;
///
/// let prism = Prism::new();
/// let session = prism.analyze("orders.csv").unwrap();
///
/// println!("Columns: {}", session.columns.len());
/// println!("Dependencies: {}", session.dependencies.len());
/// println!("Currently in {}", session.normal_form.classification);
/// ```
pub struct Prism {
    config: PrismConfig,
}

impl Prism {
    /// Create a new Prism instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(PrismConfig::default())
    }

    /// Create a Prism instance with custom configuration.
    pub fn with_config(config: PrismConfig) -> Self {
        Self { config }
    }

    /// Analyze a data file: parse, profile columns, detect dependencies,
    /// infer keys and classify the current normal form.
    pub fn analyze(&self, path: impl AsRef<Path>) -> Result<AnalysisSession> {
        let parser = Parser::with_config(self.config.parser.clone());
        let (dataset, source) = parser.parse_file(path)?;
        Ok(self.analyze_dataset(&dataset, source))
    }

    /// Analyze an already parsed dataset.
    pub fn analyze_dataset(&self, dataset: &Dataset, source: SourceMetadata) -> AnalysisSession {
        let columns = profile_columns(dataset);

        let detector = FdDetector::with_config(self.config.detector.clone());
        let report = detector.detect(dataset);

        let now = Utc::now();
        let mut session = AnalysisSession {
            version: SESSION_VERSION.to_string(),
            source,
            columns,
            dependencies: report.dependencies,
            unique_columns: report.unique_columns,
            keys: Vec::new(),
            normal_form: NormalFormReport {
                classification: NormalForm::Bcnf,
                violations: Vec::new(),
            },
            sampled: report.sampled,
            created_at: now,
            updated_at: now,
        };
        session.recompute_derived();
        session
    }
}

impl Default for Prism {
    fn default() -> Self {
        Self::new()
    }
}
