//! Batch command - confirm or reject multiple dependencies at once.

use std::path::PathBuf;

use colored::Colorize;
use prism::AnalysisSession;

use super::resolve_session_path;

pub fn run(
    file: PathBuf,
    accept: bool,
    reject: bool,
    all: bool,
    determinant: Option<String>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !accept && !reject {
        return Err("Must specify --accept or --reject".into());
    }
    if !all && determinant.is_none() {
        return Err("Must specify --all or --determinant to select dependencies".into());
    }

    let session_path = resolve_session_path(&file);
    if !session_path.exists() {
        return Err(format!("Analysis file not found: {}", session_path.display()).into());
    }

    let mut session = AnalysisSession::load(&session_path)?;

    let matching: Vec<String> = session
        .pending()
        .iter()
        .filter(|fd| match &determinant {
            Some(col) => fd.determinant.contains(col),
            None => true,
        })
        .map(|fd| fd.id.clone())
        .collect();

    if matching.is_empty() {
        println!("No pending dependencies match.");
        return Ok(());
    }

    for id in &matching {
        if verbose {
            let fd = session.dependency(id).expect("matching id");
            println!(
                "  {} {}",
                if accept { "confirm".green() } else { "reject".red() },
                fd
            );
        }
        if accept {
            session.confirm(id)?;
        } else {
            session.reject(id)?;
        }
    }

    session.save(&session_path)?;

    println!(
        "{} {} dependencies.",
        if accept { "Confirmed".green().bold() } else { "Rejected".red().bold() },
        matching.len().to_string().white().bold()
    );

    Ok(())
}
