// UI layer: provides a simple interactive menu using `dialoguer`.
// Each menu entry maps onto one `Session` operation; rendering lives in
// `render` so this file only deals with prompts and spinners.

use crate::api::{ApiClient, Operation};
use crate::render;
use crate::session::{Outcome, SelectedFile, Session, SPREADSHEET_EXTENSIONS};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

const LAST_DIR_FILE: &str = ".excel_analyzer_last_dir";

/// Main interactive menu. Runs a select loop over a fresh `Session`
/// until the user chooses "Exit".
///
/// Note: `Select::interact()` is keyboard-driven: you can use arrow keys
/// and Enter to choose an option.
pub fn main_menu(api: ApiClient) -> Result<()> {
    let mut session = Session::new();
    println!("{}", "Excel Data Analyzer".bold());
    println!("Backend: {}\n", api.base_url());

    loop {
        render::print_session(&session);
        let items = menu_items(&session);
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => select_file(&mut session)?,
            1 => run_operation(&mut session, &api, Operation::Parse)?,
            2 => run_operation(&mut session, &api, Operation::Analyze)?,
            3 => session.reset(),
            4 => check_health(&api)?,
            5 => break,
            _ => {}
        }
        println!();
    }
    Ok(())
}

fn menu_items(session: &Session) -> Vec<String> {
    // Parse/Analyze stay selectable but do nothing without a file.
    let hint = if session.can_dispatch() {
        ""
    } else {
        " (select a file first)"
    };
    vec![
        "Select file".to_string(),
        format!("Parse Excel{hint}"),
        format!("AI Analysis{hint}"),
        "Clear".to_string(),
        "Check backend health".to_string(),
        "Exit".to_string(),
    ]
}

/// Ask for a path, or open the native file dialog when left empty.
fn select_file(session: &mut Session) -> Result<()> {
    let typed: String = Input::new()
        .with_prompt("Spreadsheet path (leave empty to browse)")
        .allow_empty(true)
        .interact_text()?;

    let path = if typed.trim().is_empty() {
        match browse_for_spreadsheet() {
            Some(path) => path,
            None => {
                println!("No file chosen.");
                return Ok(());
            }
        }
    } else {
        PathBuf::from(typed.trim())
    };

    match SelectedFile::open(&path) {
        Ok(file) => {
            if !file.has_spreadsheet_extension() {
                println!(
                    "{} does not look like an .xlsx/.xls file, it will be sent anyway.",
                    file.name()
                );
            }
            if let Some(dir) = path.parent() {
                if let Err(e) = persist_last_dir(dir) {
                    tracing::warn!(error = %e, "could not remember last directory");
                }
            }
            session.select_file(file);
        }
        Err(e) => render::print_error_banner(&format!("Cannot open {}: {}", path.display(), e)),
    }
    Ok(())
}

fn browse_for_spreadsheet() -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new().add_filter("Excel", SPREADSHEET_EXTENSIONS);
    if let Some(dir) = load_last_dir().or_else(dirs::home_dir) {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_file()
}

/// Dispatch one action with a spinner while the request is outstanding.
fn run_operation(session: &mut Session, api: &ApiClient, operation: Operation) -> Result<()> {
    if !session.can_dispatch() {
        println!("Select a file first.");
        return Ok(());
    }
    let spinner = spinner("Processing...")?;
    session.run(api, operation);
    spinner.finish_and_clear();
    Ok(())
}

fn check_health(api: &ApiClient) -> Result<()> {
    let spinner = spinner("Checking backend...")?;
    let res = api.health();
    spinner.finish_and_clear();
    match res {
        Ok(status) => println!("{}", render::pretty_json(&status)),
        Err(e) => render::print_error_banner(&format!("Health check failed: {e}")),
    }
    Ok(())
}

/// Run a single action without the menu, printing the result to stdout.
/// Returns whether the request succeeded.
pub fn run_once(api: &ApiClient, operation: Operation, path: &Path) -> Result<bool> {
    let file = SelectedFile::open(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;
    let mut session = Session::new();
    session.select_file(file);

    let spinner = spinner("Processing...")?;
    session.run(api, operation);
    spinner.finish_and_clear();

    // stdout carries only the JSON so the output can be piped
    match one_shot_report(&session) {
        Ok(json) => {
            println!("{json}");
            Ok(true)
        }
        Err(message) => {
            eprintln!("{message}");
            Ok(false)
        }
    }
}

/// What a one-shot run prints: the pretty JSON on success, or the error
/// line meant for stderr.
fn one_shot_report(session: &Session) -> std::result::Result<String, String> {
    match session.outcome() {
        Some(Outcome::Success(result)) => Ok(render::pretty_json(&result.data)),
        Some(Outcome::Failure(message)) => Err(message.clone()),
        None => Err("No response was recorded".to_string()),
    }
}

/// Print the backend health document. Returns whether the call succeeded.
pub fn health_once(api: &ApiClient) -> Result<bool> {
    match api.health() {
        Ok(status) => {
            println!("{}", render::pretty_json(&status));
            Ok(true)
        }
        Err(e) => {
            eprintln!("Health check failed: {e}");
            Ok(false)
        }
    }
}

/// indicatif spinner ticking on its own thread, so it keeps moving while
/// the blocking request runs.
fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Remember the directory of the last picked file in the user's home.
fn persist_last_dir(dir: &Path) -> Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    std::fs::write(home.join(LAST_DIR_FILE), dir.to_string_lossy().as_bytes())?;
    Ok(())
}

fn load_last_dir() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let data = std::fs::read_to_string(home.join(LAST_DIR_FILE)).ok()?;
    let dir = PathBuf::from(data.trim());
    dir.is_dir().then_some(dir)
}
