// Terminal rendering of the session state: selected file line, error
// banner and the pretty-printed result. The string builders are kept
// separate from printing so they can be tested.

use crate::api::Operation;
use crate::session::{Outcome, SelectedFile, Session};
use crossterm::style::Stylize;
use serde_json::Value;

/// `Selected: book.xlsx (12.3 KB)`
pub fn file_summary(file: &SelectedFile) -> String {
    format!(
        "Selected: {} ({:.1} KB)",
        file.name(),
        file.size() as f64 / 1024.0
    )
}

pub fn result_heading(operation: Operation) -> &'static str {
    match operation {
        Operation::Parse => "Parse Results",
        Operation::Analyze => "AI Analysis Results",
    }
}

/// Two-space indented JSON, as returned by the backend.
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn print_error_banner(message: &str) {
    println!("{}", format!(" {message} ").white().on_dark_red());
}

pub fn print_result(operation: Operation, data: &Value) {
    println!("{}", result_heading(operation).bold());
    println!("{}", pretty_json(data));
}

/// Print everything the user should currently see.
pub fn print_session(session: &Session) {
    match session.selected() {
        Some(file) => println!("{}", file_summary(file).dark_grey()),
        None => println!("{}", "No file selected".dark_grey()),
    }
    if session.is_loading() {
        println!("Processing...");
    }
    match session.outcome() {
        Some(Outcome::Failure(message)) => print_error_banner(message),
        Some(Outcome::Success(result)) => print_result(result.operation, &result.data),
        None => {}
    }
}
