use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use log::{debug, info};
use scaffold_core::{DialoguerPrompt, Outcome, SystemRunner};
use scaffold_create::CreateConfig;
use scaffold_dist::DistConfig;
use scaffold_release::ReleaseConfig;
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "scaffold")]
#[command(about = "Create, release and distill JavaScript/TypeScript projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a new project from a template
    Create(CreateConfig),
    /// Bump the patch version, commit, tag and push
    Release(ReleaseConfig),
    /// Copy an entry file's import closure into a standalone package
    Dist(DistConfig),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    let completed = match cli.command {
        Commands::Create(cfg) => {
            info!("Running create");
            match scaffold_create::run_create(cfg, &mut DialoguerPrompt, &SystemRunner)? {
                Outcome::Completed(report) => {
                    scaffold_create::print_create_summary(&mut stdout, &report)?;
                    true
                }
                Outcome::Cancelled => false,
            }
        }
        Commands::Release(cfg) => {
            info!("Running release");
            let report = scaffold_release::run_release(cfg, &SystemRunner)?;
            scaffold_release::print_release_summary(&mut stdout, &report)?;
            true
        }
        Commands::Dist(cfg) => {
            info!("Running dist");
            match scaffold_dist::run_dist(cfg, &mut DialoguerPrompt)? {
                Outcome::Completed(report) => {
                    scaffold_dist::print_dist_summary(&mut stdout, &report)?;
                    true
                }
                Outcome::Cancelled => false,
            }
        }
    };

    if completed {
        writeln!(
            stdout,
            "\n{} Finished in {}ms.",
            "●".bright_blue(),
            start.elapsed().as_millis().to_string().cyan()
        )?;
    } else {
        writeln!(stdout, "{} Cancelled", "✗".yellow())?;
    }
    stdout.flush()?;

    Ok(())
}
