// Entrypoint for the CLI application.
// - Keeps `main` small: resolve config, build the API client and hand it
//   to the menu loop or a one-shot command.
// - Returns `anyhow::Result` to keep error handling simple at the top.

use clap::{Parser, Subcommand};
use excel_analyzer_cli::api::{ApiClient, Operation};
use excel_analyzer_cli::config::{ClientConfig, BASE_URL_ENV, DEFAULT_TIMEOUT_SECS};
use excel_analyzer_cli::{logging, ui};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Send spreadsheets to the Excel Data Analyzer backend.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Backend base URL. Overrides API_BASE_URL; defaults to http://localhost:8000.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a file to /upload and print the parsed data.
    Parse { file: PathBuf },
    /// Upload a file to /analyze and print the AI analysis.
    Analyze { file: PathBuf },
    /// Query the backend's /health endpoint.
    Health,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // A local .env may provide API_BASE_URL and RUST_LOG; it is read once,
    // before logging starts.
    let _ = dotenvy::dotenv();
    let rust_log = std::env::var("RUST_LOG").ok();
    logging::init_tracing(cli.verbose, rust_log.as_deref());

    let env_url = std::env::var(BASE_URL_ENV).ok();
    let config = ClientConfig::resolve(
        cli.base_url.as_deref(),
        env_url.as_deref(),
        Duration::from_secs(cli.timeout_secs),
    )?;
    tracing::debug!(base_url = %config.base_url, "configuration resolved");

    let api = ApiClient::new(config)?;

    let ok = match cli.command {
        None => {
            // Start the interactive menu. This call blocks until the user exits.
            ui::main_menu(api)?;
            true
        }
        Some(Command::Parse { file }) => ui::run_once(&api, Operation::Parse, &file)?,
        Some(Command::Analyze { file }) => ui::run_once(&api, Operation::Analyze, &file)?,
        Some(Command::Health) => ui::health_once(&api)?,
    };
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
