//! Apply command - re-run a saved plan against new data.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use prism::{DecompositionPlan, Parser, TransformEngine};

use super::write_csv;

pub fn run(
    file: PathBuf,
    plan_path: PathBuf,
    output_dir: PathBuf,
    strict: bool,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    if !plan_path.exists() {
        return Err(format!("Plan file not found: {}", plan_path.display()).into());
    }

    let plan = DecompositionPlan::load(&plan_path)?;
    let (dataset, source) = Parser::new().parse_file(&file)?;

    println!("{} {}", "Transforming".cyan().bold(), file.display());
    println!("  Input rows: {}", source.row_count);

    let outcome = TransformEngine::new().apply(&plan, &dataset, strict)?;

    for (name, missing) in &outcome.skipped {
        println!(
            "  {} Skipping {}: missing columns {:?}",
            "Warning:".yellow().bold(),
            name,
            missing
        );
    }

    let tables_dir = output_dir.join("tables");
    fs::create_dir_all(&tables_dir)?;

    for (name, table) in &outcome.tables {
        let path = tables_dir.join(format!("{}.csv", name));
        write_csv(table, &path)?;
        println!("  Created {}.csv ({} rows)", name, table.row_count());
    }

    println!();
    println!(
        "{} Output in {}",
        "Transformation complete.".green().bold(),
        output_dir.display().to_string().cyan()
    );

    Ok(())
}
