// Client state for the upload/analyze flow. A `Session` owns the selected
// file and the outcome of the most recent request, and is the only place
// that state changes. Requests are split into `begin` and `settle` so a
// late settlement from an older request can be recognised and dropped.

use crate::api::{Backend, Operation, RequestError};
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions offered by the file picker. Advisory only.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// A file the user picked. Content is read when a request is sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl SelectedFile {
    /// Stat `path` and remember its name and size. Fails if the path does
    /// not exist or is not a regular file.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let meta = std::fs::metadata(&path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        Ok(SelectedFile {
            path,
            name,
            size: meta.len(),
        })
    }

    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, size: u64) -> Self {
        SelectedFile {
            path: path.into(),
            name: name.into(),
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn has_spreadsheet_extension(&self) -> bool {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                SPREADSHEET_EXTENSIONS
                    .iter()
                    .any(|allowed| e.eq_ignore_ascii_case(allowed))
            })
            .unwrap_or(false)
    }
}

/// The JSON a successful request returned, tagged with the action.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OperationResult {
    #[serde(rename = "type")]
    pub operation: Operation,
    pub data: Value,
}

/// Result and error are mutually exclusive, so they share one slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success(OperationResult),
    Failure(String),
}

/// Proof that a request was dispatched. Must be handed back to
/// `Session::settle` exactly once.
#[must_use = "a dispatched request must be settled"]
#[derive(Debug)]
pub struct Ticket {
    operation: Operation,
    generation: u64,
    file: SelectedFile,
}

impl Ticket {
    /// The file as it was selected when the request was dispatched.
    pub fn file(&self) -> &SelectedFile {
        &self.file
    }
}

#[derive(Debug, Default)]
pub struct Session {
    selected: Option<SelectedFile>,
    outcome: Option<Outcome>,
    in_flight: usize,
    // Bumped by every dispatch, selection and reset.
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// True while at least one dispatched request has not settled.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn result(&self) -> Option<&OperationResult> {
        match &self.outcome {
            Some(Outcome::Success(result)) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Failure(msg)) => Some(msg),
            _ => None,
        }
    }

    /// Whether Parse/Analyze would currently do anything.
    pub fn can_dispatch(&self) -> bool {
        self.selected.is_some() && !self.is_loading()
    }

    /// Replace the selected file and clear any previous result or error.
    /// The loading state is left alone.
    pub fn select_file(&mut self, file: SelectedFile) {
        tracing::debug!(file = file.name(), size = file.size(), "file selected");
        self.selected = Some(file);
        self.outcome = None;
        self.generation += 1;
    }

    /// Start a request. Returns `None` without touching any state when no
    /// file is selected or another request is still loading.
    pub fn begin(&mut self, operation: Operation) -> Option<Ticket> {
        if self.is_loading() {
            return None;
        }
        let file = self.selected.clone()?;
        self.generation += 1;
        self.in_flight += 1;
        self.outcome = None;
        tracing::debug!(
            operation = operation.tag(),
            generation = self.generation,
            "request dispatched"
        );
        Some(Ticket {
            operation,
            generation: self.generation,
            file,
        })
    }

    /// Record how a dispatched request ended. The loading state is always
    /// released; the outcome is only stored if nothing newer (a dispatch,
    /// selection or reset) happened since the ticket was issued. Returns
    /// whether the outcome was stored.
    pub fn settle(&mut self, ticket: Ticket, response: Result<Value, RequestError>) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        if ticket.generation != self.generation {
            tracing::debug!(
                operation = ticket.operation.tag(),
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale response"
            );
            return false;
        }

        self.outcome = Some(match response {
            Ok(data) => Outcome::Success(OperationResult {
                operation: ticket.operation,
                data,
            }),
            Err(err) => {
                let message = err.failure_message(ticket.operation);
                tracing::debug!(error = %err, "request failed");
                Outcome::Failure(message)
            }
        });
        true
    }

    /// Dispatch `operation` through `backend` and settle it before
    /// returning. Returns false if the action was a no-op.
    pub fn run<B: Backend + ?Sized>(&mut self, backend: &B, operation: Operation) -> bool {
        let Some(ticket) = self.begin(operation) else {
            return false;
        };
        let response = backend.submit(operation, ticket.file());
        self.settle(ticket, response);
        true
    }

    /// Clear file, result and error. An in-flight request keeps running
    /// and still releases the loading state when it settles, but its
    /// outcome is discarded.
    pub fn reset(&mut self) {
        self.selected = None;
        self.outcome = None;
        self.generation += 1;
    }
}
