//! TRACE.ORACLE CLI
//!
//! Generates reference traces from a control-flow model, derives defect
//! traces from them, and compares candidates against references.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;
mod config;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::bail;
use config::OracleConfig;
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oracle")]
#[command(about = "TRACE.ORACLE - Log-trace test oracle for embedded software", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace scenarios over a model and write reference traces
    Generate {
        /// Control-flow model file
        #[arg(short, long)]
        model: PathBuf,
        /// Scenario configuration file
        #[arg(short, long)]
        scenarios: PathBuf,
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Seed for every random draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Derive defect traces from reference traces
    Mutate {
        /// Directory of reference traces
        #[arg(short, long)]
        traces: Option<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Seed for every random draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Compare one candidate trace against a reference
    Compare {
        /// Reference trace
        #[arg(short, long)]
        reference: PathBuf,
        /// Candidate trace
        #[arg(short, long)]
        candidate: PathBuf,
        /// Report file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Compare every defect and reference trace, writing one report each
    Analyze {
        /// Directory of reference traces
        #[arg(long)]
        references: Option<PathBuf>,
        /// Directory of defect traces
        #[arg(long)]
        defects: Option<PathBuf>,
        /// Report directory
        #[arg(long)]
        reports: Option<PathBuf>,
    },
    /// Check trace files for structural problems
    Validate {
        /// Trace files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.json);
    let config = OracleConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            model,
            scenarios,
            out,
            seed,
        } => {
            let out = out.unwrap_or_else(|| config.directories.references.clone());
            let seed = config.root_seed(seed);
            let outcomes = commands::generate::run(&model, &scenarios, &out, &config, &seed)?;
            for outcome in &outcomes {
                println!(
                    "{} {} path(s), {} file(s)",
                    style(&outcome.scenario).bold(),
                    outcome.paths,
                    outcome.files.len()
                );
                if let Some(earlier) = &outcome.collides_with {
                    println!(
                        "  {} same file names as {}, its traces were overwritten",
                        style("warning").yellow(),
                        earlier
                    );
                }
            }
            Ok(())
        }
        Commands::Mutate { traces, out, seed } => {
            let traces = traces.unwrap_or_else(|| config.directories.references.clone());
            let out = out.unwrap_or_else(|| config.directories.defects.clone());
            let seed = config.root_seed(seed);
            let outcome = commands::mutate::run(&traces, &out, &config, &seed)?;
            println!("Wrote {} defect trace(s) to {}", outcome.written.len(), out.display());
            for skipped in &outcome.skipped {
                println!("{} {}", style("skipped").yellow(), skipped);
            }
            Ok(())
        }
        Commands::Compare {
            reference,
            candidate,
            out,
        } => {
            let report = commands::compare::run(&reference, &candidate, out.as_deref())?;
            let line = report.summary_line();
            if report.is_clean() {
                println!("{}", style(line).green());
            } else {
                println!("{}", style(line).red());
                for deviation in &report.deviations {
                    println!("  {}: {}", deviation.kind, deviation.description);
                }
            }
            Ok(())
        }
        Commands::Analyze {
            references,
            defects,
            reports,
        } => {
            let references = references.unwrap_or_else(|| config.directories.references.clone());
            let defects = defects.unwrap_or_else(|| config.directories.defects.clone());
            let reports = reports.unwrap_or_else(|| config.directories.reports.clone());
            let show_progress = !cli.json && console::Term::stderr().is_term();
            let outcome =
                commands::analyze::run(&references, &defects, &reports, show_progress).await?;
            println!(
                "Analyzed {} trace(s): {} clean, {} with deviations, {} skipped",
                outcome.analyzed.len(),
                outcome.analyzed.len() - outcome.deviating(),
                outcome.deviating(),
                outcome.skipped.len()
            );
            for analyzed in outcome.analyzed.iter().filter(|a| a.deviations > 0) {
                println!(
                    "{} {} ({} deviation(s)) -> {}",
                    style("deviation").red(),
                    analyzed.candidate,
                    analyzed.deviations,
                    analyzed.report.display()
                );
            }
            for skipped in &outcome.skipped {
                println!("{} {}", style("skipped").yellow(), skipped);
            }
            Ok(())
        }
        Commands::Validate { files } => {
            let reports = commands::validate::run(&files);
            let failed = reports.iter().filter(|r| !r.passed()).count();
            for report in &reports {
                let line = report.summary();
                if report.passed() {
                    println!("{}", style(line).green());
                } else {
                    println!("{}", style(line).red());
                }
                for error in &report.errors {
                    println!("  {} {}", style("error").red(), error);
                }
                for warning in &report.warnings {
                    println!("  {} {}", style("warning").yellow(), warning);
                }
            }
            if failed > 0 {
                bail!("{failed} of {} file(s) failed validation", reports.len());
            }
            Ok(())
        }
    }
}
