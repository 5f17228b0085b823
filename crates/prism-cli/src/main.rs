//! Prism CLI - schema normalization for flat tabular data.

mod cli;
mod commands;
mod render;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            file,
            output,
            max_arity,
            sample_threshold,
            delimiter,
        } => commands::analyze::run(file, output, max_arity, sample_threshold, delimiter, cli.verbose),

        Commands::Review { file } => commands::review::run(file, cli.verbose),

        Commands::Batch {
            file,
            accept,
            reject,
            all,
            determinant,
        } => commands::batch::run(file, accept, reject, all, determinant, cli.verbose),

        Commands::Status { file, json } => commands::status::run(file, json, cli.verbose),

        Commands::Normalize {
            file,
            session,
            target,
            output_dir,
        } => commands::normalize::run(file, session, target, output_dir, cli.verbose),

        Commands::Apply {
            file,
            plan,
            output_dir,
            strict,
        } => commands::apply::run(file, plan, output_dir, strict, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
