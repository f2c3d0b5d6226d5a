mod declaration;
mod error;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use flagset_core::EXIT_STATUS;
use tracing::{debug, info};

use crate::declaration::{ParseReport, build, check, load};
use crate::error::Result;

/// Report serialization format.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "flagset")]
#[command(about = "Parse argument lists against declared flag sets", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse arguments given after `--` and print the resulting values.
    Parse(ParseArgs),
    /// Print the usage text of a declaration.
    Usage(UsageArgs),
    /// Validate a declaration without building it.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Declaration file (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    spec: PathBuf,
    /// Output format for the report.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to parse.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct UsageArgs {
    /// Declaration file (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    spec: PathBuf,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Declaration file (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    spec: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Usage(args) => run_usage(args),
        Command::Check(args) => run_check(args),
    };

    match result {
        Ok(0) => {}
        Ok(status) => process::exit(status),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

/// Returns the process exit status: 0 on success or help, 2 when the
/// arguments were rejected. The flag set has already reported the failure.
fn run_parse(args: ParseArgs) -> Result<i32> {
    let declaration = load(&args.spec)?;
    let mut bound = build(&declaration)?;
    debug!(spec = %args.spec.display(), args = ?args.args, "Parsing arguments");

    match bound.flags.parse(args.args) {
        Ok(()) => {}
        Err(err) if err.is_help() => return Ok(0),
        Err(err) => {
            info!(error = %err, "Arguments rejected");
            return Ok(EXIT_STATUS);
        }
    }

    print!("{}", format_report(&bound.report(), args.format)?);
    Ok(0)
}

fn run_usage(args: UsageArgs) -> Result<i32> {
    let declaration = load(&args.spec)?;
    let mut bound = build(&declaration)?;
    bound.flags.set_output(io::stdout());
    bound.flags.usage();
    Ok(0)
}

fn run_check(args: CheckArgs) -> Result<i32> {
    let declaration = load(&args.spec)?;
    let problems = check(&declaration);
    if problems.is_empty() {
        println!(
            "Declaration '{}' is valid ({} top-level flag(s)).",
            args.spec.display(),
            declaration.flags.len()
        );
        return Ok(0);
    }

    for problem in &problems {
        eprintln!("{problem}");
    }
    eprintln!("{} problem(s) found.", problems.len());
    Ok(1)
}

fn format_report(report: &ParseReport, format: CliOutputFormat) -> Result<String> {
    Ok(match format {
        CliOutputFormat::Json => {
            let mut raw = serde_json::to_string_pretty(report)?;
            raw.push('\n');
            raw
        }
        CliOutputFormat::Yaml => serde_yaml::to_string(report)?,
    })
}
