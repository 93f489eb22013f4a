// itacv - compare ITAC assessment report extractions against their template

mod compare;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use compare::{CompareArgs, SchemaCommands};
use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "itacv")]
#[command(about = "Cross-check an assessment report against its spreadsheet template")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a report extraction with a template extraction (exit 0 = all fields agree)
    #[command(after_help = "\
Exit code 3 means at least one field disagrees (value outside tolerance or \
wrong type), or the energy cost line items do not add up to their total. \
Missing fields are reported but only fail the run with --strict (exit 4).

Examples:
  itacv compare report.json template.json
  itacv compare report.json template.json --json
  itacv compare report.json template.json --tolerance 0.005 --strict
  itacv compare report.json template.json --schema custom.toml --output result.json")]
    Compare {
        /// Extraction from the narrative report (JSON)
        docx: PathBuf,

        /// Extraction from the spreadsheet template (JSON)
        excel: PathBuf,

        /// Schema TOML file (defaults to the built-in ITAC schema)
        #[arg(long, env = "ITACV_SCHEMA")]
        schema: Option<PathBuf>,

        /// Relative tolerance for numeric fields (overrides the schema's)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Output JSON to stdout instead of only the human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Treat missing fields as a failure (exit 4)
        #[arg(long)]
        strict: bool,
    },

    /// Inspect and validate comparison schemas
    #[command(subcommand)]
    Schema(SchemaCommands),
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  itacv-compare ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

/// Logs go to stderr so `--json` stdout stays a single JSON value.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            eprintln!("Usage: itacv <command> [options]");
            eprintln!("       itacv --help for more information");
            Err(CliError { code: EXIT_USAGE, message: String::new(), hint: None })
        }
        Some(Commands::Compare { docx, excel, schema, tolerance, json, output, strict }) => {
            compare::cmd_compare(CompareArgs { docx, excel, schema, tolerance, json, output, strict })
        }
        Some(Commands::Schema(cmd)) => compare::cmd_schema(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
