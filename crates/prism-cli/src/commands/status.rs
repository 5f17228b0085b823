//! Status command - show review progress and the current classification.

use std::path::PathBuf;

use colored::Colorize;
use prism::AnalysisSession;

use super::resolve_session_path;

pub fn run(file: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session_path = resolve_session_path(&file);
    if !session_path.exists() {
        return Err(format!(
            "Analysis file not found: {}\nRun 'prism analyze {}' first.",
            session_path.display(),
            file.display()
        )
        .into());
    }

    let session = AnalysisSession::load(&session_path)?;
    let counts = session.counts();

    if json_output {
        let status = serde_json::json!({
            "file": session.source.file,
            "progress": session.progress(),
            "dependencies": {
                "auto_confirmed": counts.auto_confirmed,
                "needs_review": counts.needs_review,
                "confirmed": counts.confirmed,
                "rejected": counts.rejected,
            },
            "unique_columns": session.unique_columns,
            "candidate_keys": session.keys,
            "normal_form": session.normal_form.classification,
            "violations": session.normal_form.violations.len(),
            "is_complete": session.is_complete(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Analysis status for".cyan().bold(),
        session.source.file.white()
    );
    println!();

    // Progress bar over reviewable dependencies.
    let progress = session.progress();
    let reviewable = counts.needs_review + counts.confirmed + counts.rejected;
    let decided = counts.confirmed + counts.rejected;
    let bar_width = 30;
    let filled = (progress * bar_width as f64).round() as usize;
    let bar: String = "█".repeat(filled) + &"░".repeat(bar_width - filled);

    println!(
        "Review progress: {} {}/{} ({:.0}%)",
        bar.cyan(),
        decided.to_string().white().bold(),
        reviewable,
        progress * 100.0
    );
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
    println!("  Confirmed:      {}", counts.confirmed.to_string().green());
    println!("  Rejected:       {}", counts.rejected.to_string().red());
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
    println!();

    if session.is_complete() {
        println!(
            "All dependencies decided. Run {} to decompose.",
            format!("prism normalize {}", session.source.file).cyan().bold()
        );
    } else {
        println!(
            "Run {} to continue reviewing.",
            format!("prism review {}", session_path.display()).cyan().bold()
        );
    }

    Ok(())
}
