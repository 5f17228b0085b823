//! Review command - interactive confirmation of uncertain dependencies.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;
use prism::AnalysisSession;

use super::resolve_session_path;

pub fn run(file: PathBuf, _verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session_path = resolve_session_path(&file);
    if !session_path.exists() {
        return Err(format!(
            "Analysis file not found: {}\nRun 'prism analyze {}' first.",
            session_path.display(),
            file.display()
        )
        .into());
    }

    let mut session = AnalysisSession::load(&session_path)?;
    let pending_ids: Vec<String> = session.pending().iter().map(|fd| fd.id.clone()).collect();

    if pending_ids.is_empty() {
        println!("{}", "Nothing to review.".green());
        return Ok(());
    }

    println!(
        "{} dependencies need review. [y] confirm  [n] reject  [s] skip  [q] quit",
        pending_ids.len().to_string().yellow().bold()
    );
    println!();

    let stdin = io::stdin();
    let mut decided = 0usize;

    for (i, id) in pending_ids.iter().enumerate() {
        let fd = session.dependency(id).expect("pending id").clone();
        println!(
            "[{}/{}] {}",
            i + 1,
            pending_ids.len(),
            fd.to_string().white().bold()
        );
        println!(
            "      {:.2}% confidence, {} violating group(s) out of {}",
            fd.confidence * 100.0,
            fd.violation_count,
            fd.support
        );
        print!("      Does this dependency hold? [y/n/s/q] ");
        io::stdout().flush()?;

        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;

        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => {
                session.confirm(id)?;
                session.save(&session_path)?;
                decided += 1;
                println!("      {}", "confirmed".green());
            }
            "n" | "no" => {
                session.reject(id)?;
                session.save(&session_path)?;
                decided += 1;
                println!("      {}", "rejected".red());
            }
            "q" | "quit" => break,
            _ => println!("      skipped"),
        }
        println!();
    }

    let counts = session.counts();
    println!(
        "Reviewed {} dependencies ({} still pending).",
        decided.to_string().white().bold(),
        counts.needs_review
    );
    if session.is_complete() {
        println!(
            "Run {} to decompose.",
            format!("prism normalize {}", file.display()).cyan().bold()
        );
    }

    Ok(())
}
