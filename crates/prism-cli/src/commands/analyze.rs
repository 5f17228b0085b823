//! Analyze command - detect dependencies and create an analysis session.

use std::path::PathBuf;

use colored::Colorize;
use prism::{analysis_path, DetectorConfig, FdStatus, ParserConfig, Prism, PrismConfig};

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    max_arity: usize,
    sample_threshold: usize,
    delimiter: Option<char>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let config = PrismConfig {
        parser: ParserConfig {
            delimiter: delimiter.map(|c| c as u8),
            ..ParserConfig::default()
        },
        detector: DetectorConfig {
            max_arity,
            sample_threshold,
            ..DetectorConfig::default()
        },
    };

    println!("{} {}", "Analyzing".cyan().bold(), file.display());
    let session = Prism::with_config(config).analyze(&file)?;

    println!(
        "  {} rows, {} columns ({})",
        session.source.row_count, session.source.column_count, session.source.format
    );
    if session.sampled {
        println!("  {}", "Detection ran on a sample; candidates re-measured on full data".yellow());
    }

    if verbose {
        println!();
        println!("{}", "Columns:".yellow().bold());
        for col in &session.columns {
            println!(
                "  {:<24} {:?}{}{}",
                col.name,
                col.inferred_type,
                if col.nullable { ", nullable" } else { "" },
                if col.unique { ", unique" } else { "" },
            );
        }
    }

    let counts = session.counts();
    println!();
    println!("{}", "Dependencies:".yellow().bold());
    println!(
        "  Auto-confirmed: {}",
        counts.auto_confirmed.to_string().green()
    );
    println!(
        "  Needs review:   {}",
        counts.needs_review.to_string().yellow()
    );

    for fd in session.pending() {
        println!(
            "    {} {} ({:.1}% confidence, {} violation(s) in {} groups)",
            fd.id.dimmed(),
            fd,
            fd.confidence * 100.0,
            fd.violation_count,
            fd.support
        );
    }

    if !session.unique_columns.is_empty() {
        println!();
        println!(
            "{} {}",
            "Key candidate columns:".yellow().bold(),
            session.unique_columns.join(", ")
        );
    }

    if !session.keys.is_empty() {
        let keys: Vec<String> = session.keys.iter().map(|k| k.to_string()).collect();
        println!("{} {}", "Candidate keys:".yellow().bold(), keys.join(", "));
    }

    println!();
    println!(
        "{} {}",
        "Current normal form:".yellow().bold(),
        session.normal_form.classification.to_string().white().bold()
    );
    if verbose {
        for violation in &session.normal_form.violations {
            println!("  [{}] {}", violation.level, violation.explanation);
        }
    }

    let out_path = output.unwrap_or_else(|| analysis_path(&file));
    session.save(&out_path)?;
    println!();
    println!("Analysis saved to {}", out_path.display().to_string().cyan());

    if session
        .dependencies
        .iter()
        .any(|fd| fd.status == FdStatus::NeedsReview)
    {
        println!(
            "Run {} to review uncertain dependencies.",
            format!("prism review {}", out_path.display()).cyan().bold()
        );
    } else {
        println!(
            "Run {} to decompose.",
            format!("prism normalize {}", file.display()).cyan().bold()
        );
    }

    Ok(())
}
