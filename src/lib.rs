// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the interactive client.
//
// Module responsibilities:
// - `config`: Resolves the backend base URL and timeout once at startup.
// - `api`: Encapsulates HTTP interactions with the backend (upload,
//   analyze, health) and turns error responses into display text.
// - `session`: Owns the selected file and the last result or error, and
//   drops responses that arrive after the state has moved on.
// - `render`: Formats session state for the terminal.
// - `ui`: Implements the terminal menu and delegates to `session`.
// - `logging`: Sets up the `tracing` subscriber.
pub mod api;
pub mod config;
pub mod logging;
pub mod render;
pub mod session;
pub mod ui;
