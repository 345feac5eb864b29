mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "veritas-cli")]
#[command(about = "Veritas CLI - Verify candidate solutions against literal test cases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a candidate against a cases file and print the report as JSON
    Verify {
        /// Candidate source file
        #[arg(long)]
        code: PathBuf,

        /// JSON array of {"input", "output"} objects
        #[arg(long)]
        cases: PathBuf,

        /// Call this top-level function instead of the first definition
        #[arg(long, conflicts_with_all = ["class", "method"])]
        entry: Option<String>,

        /// Drive this class with commands/arguments variables
        #[arg(long, conflicts_with = "method")]
        class: Option<String>,

        /// Call CLASS.NAME on a fresh instance per case
        #[arg(long)]
        method: Option<String>,

        /// Parameter structure kind, e.g. head=linkedList (repeatable)
        #[arg(long = "schema", value_name = "PARAM=KIND")]
        schema: Vec<String>,

        /// Wall-clock limit for the whole run
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// process or docker (defaults to HARNESS_BACKEND, then process)
        #[arg(long)]
        backend: Option<String>,

        /// Runtime config file (defaults to config/runtimes.json)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check every case input against a constraints file
    Check {
        /// JSON array of {"input", "output"} objects
        #[arg(long)]
        cases: PathBuf,

        /// JSON array of constraint strings, e.g. "2 <= nums.length <= 10^4"
        #[arg(long)]
        constraints: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // stdout carries the JSON report; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let ok = match cli.command {
        Commands::Verify {
            code,
            cases,
            entry,
            class,
            method,
            schema,
            timeout_ms,
            backend,
            config,
        } => {
            let options = commands::VerifyOptions {
                code,
                cases,
                entry: commands::parse_entry(entry, class, method)?,
                schema: commands::parse_schema(&schema)?,
                timeout_ms,
                backend,
                config,
            };
            commands::verify(options).await?
        }
        Commands::Check { cases, constraints } => commands::check(&cases, &constraints)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
