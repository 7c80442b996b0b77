//! Binary entry point for the migrant CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Show the available recipes
//! migrant list
//!
//! # Preview a rewrite of every parsed unit under trees/
//! migrant run --recipe cleanup.assert-false-negation-to-assert-true trees/
//!
//! # Apply it in place and report as JSON
//! migrant run --recipe junit5.test-rule-to-test-info --write --format json trees/
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use migrant::cli::{list_recipes, run, RunOptions, RunReport};
use migrant::error::{MigrantError, OutputErrorCode};
use migrant::output::{emit_response, ErrorResponse, ListResponse};
use migrant::tree::print::print;

// ============================================================================
// CLI Structure
// ============================================================================

/// Structural rewrites for attributed Java syntax trees.
#[derive(Parser, Debug)]
#[command(name = "migrant", version, about = "Structural rewrites for Java syntax trees")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (RUST_LOG takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
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
enum Format {
    /// Human-readable text (default).
    #[default]
    Text,
    /// JSON response.
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered recipes.
    List {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Run recipes over parsed source trees.
    Run {
        /// Recipe to run; repeat to run several in order.
        #[arg(long = "recipe", value_name = "NAME")]
        recipes: Vec<String>,

        /// Config file (default: .migrant/config.toml in the current directory).
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write rewritten trees back to their files.
        #[arg(long)]
        write: bool,

        /// SourceFile JSON files or directories containing them.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

// ============================================================================
// Entry
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Errors go to stdout as JSON.
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(error_code.code())
        }
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

fn execute(cli: Cli) -> Result<(), MigrantError> {
    match cli.command {
        Command::List { format } => execute_list(format),
        Command::Run {
            recipes,
            config,
            format,
            write,
            paths,
        } => {
            let project_root =
                std::env::current_dir().map_err(|e| MigrantError::io(".", e))?;
            let options = RunOptions {
                recipes,
                config,
                project_root,
                paths,
                write,
            };
            execute_run(&options, format)
        }
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_list(format: Format) -> Result<(), MigrantError> {
    let recipes = list_recipes();
    let mut stdout = io::stdout();
    let written = match format {
        Format::Json => emit_response(&ListResponse::new(recipes), &mut stdout),
        Format::Text => recipes.iter().try_for_each(|r| {
            writeln!(stdout, "{}\n    {}\n    {}", r.name, r.display_name, r.description)
        }),
    };
    written.map_err(|e| MigrantError::io("<stdout>", e))
}

fn execute_run(options: &RunOptions, format: Format) -> Result<(), MigrantError> {
    let report = run(options)?;
    let mut stdout = io::stdout();
    let written = match format {
        Format::Json => emit_response(&report.into_response(), &mut stdout),
        Format::Text => write_text_report(&report, &mut stdout),
    };
    written.map_err(|e| MigrantError::io("<stdout>", e))
}

/// Canonical print of each changed unit, then diagnostics and a summary line.
fn write_text_report(report: &RunReport, out: &mut impl Write) -> io::Result<()> {
    let mut changed = 0;
    for item in &report.items {
        if item.result.changed {
            changed += 1;
            let verb = if item.result.written { "rewrote" } else { "would rewrite" };
            writeln!(out, "--- {} ({})", item.result.path, verb)?;
            write!(out, "{}", print(&item.source))?;
        }
        for diagnostic in &item.result.diagnostics {
            writeln!(
                out,
                "warning: {}: [{}] {}: {}",
                item.result.path, diagnostic.recipe, diagnostic.uid, diagnostic.message
            )?;
        }
    }
    writeln!(
        out,
        "{} of {} file(s) changed",
        changed,
        report.items.len()
    )
}
