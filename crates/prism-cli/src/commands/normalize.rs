//! Normalize command - decompose the dataset and write the schema bundle.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use prism::{
    decompose_bcnf, minimal_cover, synthesize_3nf, AnalysisSession, Parser, TransformEngine,
};

use super::{resolve_session_path, write_csv};
use crate::cli::TargetForm;
use crate::render;

pub fn run(
    file: PathBuf,
    session: Option<PathBuf>,
    target: TargetForm,
    output_dir: PathBuf,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let session_path = session.unwrap_or_else(|| resolve_session_path(&file));
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
    if counts.needs_review > 0 {
        println!(
            "{} {} dependencies are still pending review and will be ignored.",
            "Warning:".yellow().bold(),
            counts.needs_review
        );
    }

    println!(
        "{} {} to {}",
        "Normalizing".cyan().bold(),
        file.display(),
        target.to_string().to_uppercase()
    );

    let attributes = session.attribute_set();
    let fds = session.normalization_dependencies();
    let cover = minimal_cover(&fds)?;
    if verbose {
        println!("  Minimal cover: {} dependencies", cover.len());
        for fd in &cover {
            println!("    {}", fd);
        }
    }

    let plan = match target {
        TargetForm::Third => synthesize_3nf(&cover, &session.keys, &attributes)?,
        TargetForm::Bcnf => decompose_bcnf(&attributes, &cover)?,
    };
    println!("  Decomposed into {} tables", plan.relations.len());

    if !plan.unenforced_dependencies.is_empty() {
        println!(
            "{} {} dependencies cannot be enforced by a single table:",
            "Warning:".yellow().bold(),
            plan.unenforced_dependencies.len()
        );
        for fd in &plan.unenforced_dependencies {
            println!("    {}", fd);
        }
    }

    // Materialize the normalized tables from the analyzed data.
    let (dataset, _) = Parser::new().parse_file(&file)?;
    let outcome = TransformEngine::new().apply(&plan, &dataset, true)?;

    let tables_dir = output_dir.join("tables");
    fs::create_dir_all(&tables_dir)?;

    for (name, table) in &outcome.tables {
        let path = tables_dir.join(format!("{}.csv", name));
        write_csv(table, &path)?;
        println!("  Created {} ({} rows)", path.display(), table.row_count());
    }

    let plan_path = output_dir.join("plan.json");
    plan.save(&plan_path)?;
    println!("  Created {}", plan_path.display());

    let sql_path = output_dir.join("schema.sql");
    fs::write(&sql_path, render::sql_ddl(&plan, &session.columns))?;
    println!("  Created {}", sql_path.display());

    let erd_path = output_dir.join("erd.md");
    fs::write(
        &erd_path,
        format!(
            "# Entity Relationship Diagram\n\n```mermaid\n{}\n```\n",
            render::mermaid_erd(&plan, &session.columns)
        ),
    )?;
    println!("  Created {}", erd_path.display());

    let readme_path = output_dir.join("README.md");
    fs::write(&readme_path, render::readme(&plan, &session.source.file))?;
    println!("  Created {}", readme_path.display());

    println!();
    println!(
        "{} Output in {}",
        "Done.".green().bold(),
        output_dir.display().to_string().cyan()
    );

    Ok(())
}
