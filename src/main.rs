//! Binary entry point for the repofix CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Rename concrete types off their interface names
//! repofix fix-names --base ./gamelink
//!
//! # Everything, one unit, preview only
//! repofix all --unit role --dry-run
//!
//! # Machine-readable results
//! repofix fix-fixtures --format json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use repofix::cli::{run, RunRequest, Task};
use repofix_core::batch::{BatchSummary, Operation};
use repofix_core::error::{FixError, OutputErrorCode};
use repofix_core::output::{emit_response, render_text, BatchResponse, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Batch source repair for generated repository code.
#[derive(Parser, Debug)]
#[command(name = "repofix", version, about = "Batch source repair for generated repository code")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Base directory templates are resolved against (default: current directory).
    #[arg(long, global = true, default_value = ".")]
    base: PathBuf,

    /// Configuration file (default: <base>/repofix.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Show what would change without writing any file.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Only process the named unit. Can be repeated.
    #[arg(long = "unit", global = true)]
    units: Vec<String>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Status lines and a summary (default).
    #[default]
    Text,
    /// Full JSON response.
    Json,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Rename each concrete type so it no longer collides with its interface.
    FixNames {
        /// Normalize encoding and line endings first.
        #[arg(long)]
        normalize: bool,
    },
    /// Add the contract package import to each unit.
    AddImport,
    /// Remove compile-time interface assertions.
    StripAssertions,
    /// Normalize encoding, repair known corruption, and qualify constructors.
    FixEncoding,
    /// Rewrite legacy literals in test fixtures.
    FixFixtures,
    /// Run every unit operation in one pass.
    All,
}

impl Command {
    fn task(&self) -> Task {
        match self {
            Command::FixNames { .. } => Task::Units(Operation::FixNames),
            Command::AddImport => Task::Units(Operation::AddImport),
            Command::StripAssertions => Task::Units(Operation::StripAssertions),
            Command::FixEncoding => Task::Units(Operation::FixEncoding),
            Command::FixFixtures => Task::Fixtures,
            Command::All => Task::Units(Operation::All),
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    let format = cli.global.format;
    match execute(cli) {
        Ok(summary) => match emit_summary(&summary, format) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => report_error(&err, format),
        },
        Err(err) => report_error(&err, format),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<BatchSummary, FixError> {
    let normalize = matches!(cli.command, Command::FixNames { normalize: true });
    let request = RunRequest {
        base: cli.global.base,
        config: cli.global.config,
        task: cli.command.task(),
        units: cli.global.units,
        dry_run: cli.global.dry_run,
        normalize,
    };
    run(&request)
}

fn emit_summary(summary: &BatchSummary, format: OutputFormat) -> Result<(), FixError> {
    let mut stdout = io::stdout();
    let written = match format {
        OutputFormat::Text => render_text(summary, &mut stdout),
        OutputFormat::Json => emit_response(&BatchResponse::new(summary), &mut stdout),
    };
    written
        .and_then(|()| stdout.flush())
        .map_err(|e| FixError::internal(format!("failed to write output: {}", e)))
}

fn report_error(err: &FixError, format: OutputFormat) -> ExitCode {
    let error_code = OutputErrorCode::from(err);
    match format {
        OutputFormat::Json => {
            let _ = emit_response(&ErrorResponse::from_error(err), &mut io::stdout());
            let _ = io::stdout().flush();
        }
        OutputFormat::Text => {
            let _ = writeln!(io::stderr(), "error: {}", err);
        }
    }
    ExitCode::from(error_code.code())
}
