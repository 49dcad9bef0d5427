// API client module: a small blocking HTTP client that talks to the
// spreadsheet backend. It sends the selected file as multipart/form-data
// to `/upload` or `/analyze` and hands back whatever JSON comes out.

use crate::config::ClientConfig;
use crate::session::SelectedFile;
use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The two user-triggered actions. They differ only in the endpoint they
/// post to and in which JSON field the backend uses to report errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    #[serde(rename = "parse")]
    Parse,
    #[serde(rename = "analysis")]
    Analyze,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Operation::Parse => "/upload",
            Operation::Analyze => "/analyze",
        }
    }

    /// JSON key the endpoint puts its error explanation under.
    pub fn error_field(self) -> &'static str {
        match self {
            Operation::Parse => "message",
            Operation::Analyze => "detail",
        }
    }

    /// Prefix used in the `<label> failed: ...` banner.
    pub fn failure_label(self) -> &'static str {
        match self {
            Operation::Parse => "Parse",
            Operation::Analyze => "Analysis",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Operation::Parse => "parse",
            Operation::Analyze => "analysis",
        }
    }
}

/// Why a request did not produce a usable response.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("could not read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Connection, timeout, or body read failures.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-2xx status. `body` is the decoded
    /// JSON body when there was one.
    #[error("Request failed with status code {}", .status.as_u16())]
    Status {
        status: StatusCode,
        body: Option<Value>,
    },
}

impl RequestError {
    /// Text shown to the user: the endpoint's error field when the backend
    /// supplied one, otherwise this error's own description.
    pub fn display_text(&self, operation: Operation) -> String {
        if let RequestError::Status {
            body: Some(body), ..
        } = self
        {
            if let Some(text) = field_text(body, operation.error_field()) {
                return text;
            }
        }
        self.to_string()
    }

    /// Full banner message, e.g. `Parse failed: corrupt file`.
    pub fn failure_message(&self, operation: Operation) -> String {
        format!(
            "{} failed: {}",
            operation.failure_label(),
            self.display_text(operation)
        )
    }
}

// Falsy values (null, "", false, 0) count as "not provided".
fn field_text(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Anything that can carry a file to the backend and return its JSON.
/// `ApiClient` is the real implementation; tests substitute their own.
pub trait Backend {
    fn submit(&self, operation: Operation, file: &SelectedFile) -> Result<Value, RequestError>;
}

/// Blocking API client holding a reqwest client and the resolved config.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Build a client for the given configuration. The timeout applies to
    /// each request as a whole.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Query `GET /health` and return the reported status document.
    pub fn health(&self) -> Result<Value, RequestError> {
        let url = self.config.endpoint("/health");
        tracing::debug!(%url, "checking backend health");
        let res = self.client.get(&url).send()?;
        read_response(res)
    }

    /// Build the multipart form with the file under the `file` field.
    fn file_form(file: &SelectedFile) -> Result<multipart::Form, RequestError> {
        let bytes = std::fs::read(file.path()).map_err(|source| RequestError::File {
            path: file.path().to_path_buf(),
            source,
        })?;
        let part = multipart::Part::bytes(bytes)
            .file_name(file.name().to_string())
            .mime_str(spreadsheet_mime(file.name()))?;
        Ok(multipart::Form::new().part("file", part))
    }
}

impl Backend for ApiClient {
    fn submit(&self, operation: Operation, file: &SelectedFile) -> Result<Value, RequestError> {
        let url = self.config.endpoint(operation.path());
        tracing::debug!(%url, file = file.name(), size = file.size(), "posting file");

        let form = Self::file_form(file)?;
        let res = self.client.post(&url).multipart(form).send().map_err(|e| {
            tracing::warn!(%url, error = %e, "request did not complete");
            RequestError::from(e)
        })?;
        read_response(res)
    }
}

/// Turn a response into its JSON body, or a `Status` error for non-2xx.
/// A 2xx body that is not JSON is kept verbatim as a JSON string.
fn read_response(res: Response) -> Result<Value, RequestError> {
    let status = res.status();
    if !status.is_success() {
        let body = res
            .text()
            .ok()
            .and_then(|txt| serde_json::from_str::<Value>(&txt).ok());
        tracing::debug!(%status, ?body, "backend returned an error status");
        return Err(RequestError::Status { status, body });
    }
    let txt = res.text()?;
    Ok(serde_json::from_str(&txt).unwrap_or(Value::String(txt)))
}

fn spreadsheet_mime(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xls") => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_error(code: u16, body: Option<Value>) -> RequestError {
        RequestError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body,
        }
    }

    #[test]
    fn analyze_failure_uses_detail() {
        let err = status_error(500, Some(json!({"detail": "bad format"})));
        assert_eq!(
            err.failure_message(Operation::Analyze),
            "Analysis failed: bad format"
        );
    }

    #[test]
    fn parse_failure_uses_message() {
        let err = status_error(422, Some(json!({"message": "corrupt file"})));
        assert_eq!(
            err.failure_message(Operation::Parse),
            "Parse failed: corrupt file"
        );
    }

    #[test]
    fn each_endpoint_ignores_the_other_field() {
        let err = status_error(500, Some(json!({"message": "from message"})));
        assert_eq!(
            err.failure_message(Operation::Analyze),
            "Analysis failed: Request failed with status code 500"
        );

        let err = status_error(400, Some(json!({"detail": "from detail"})));
        assert_eq!(
            err.failure_message(Operation::Parse),
            "Parse failed: Request failed with status code 400"
        );
    }

    #[test]
    fn empty_or_null_field_falls_back() {
        let err = status_error(500, Some(json!({"detail": ""})));
        assert_eq!(
            err.display_text(Operation::Analyze),
            "Request failed with status code 500"
        );
        let err = status_error(500, Some(json!({"detail": null})));
        assert_eq!(
            err.display_text(Operation::Analyze),
            "Request failed with status code 500"
        );
        let err = status_error(502, None);
        assert_eq!(
            err.display_text(Operation::Parse),
            "Request failed with status code 502"
        );
    }

    #[test]
    fn false_or_zero_field_falls_back() {
        let err = status_error(500, Some(json!({"detail": false})));
        assert_eq!(
            err.failure_message(Operation::Analyze),
            "Analysis failed: Request failed with status code 500"
        );
        let err = status_error(400, Some(json!({"message": 0})));
        assert_eq!(
            err.failure_message(Operation::Parse),
            "Parse failed: Request failed with status code 400"
        );
        let err = status_error(400, Some(json!({"message": 42})));
        assert_eq!(err.failure_message(Operation::Parse), "Parse failed: 42");
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let err = status_error(422, Some(json!({"detail": [{"loc": ["file"]}]})));
        assert_eq!(
            err.display_text(Operation::Analyze),
            r#"[{"loc":["file"]}]"#
        );
    }

    #[test]
    fn file_errors_mention_the_path() {
        let err = RequestError::File {
            path: PathBuf::from("/tmp/missing.xlsx"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(
            err.failure_message(Operation::Parse),
            "Parse failed: could not read /tmp/missing.xlsx: gone"
        );
    }

    #[test]
    fn operation_tags_and_paths() {
        assert_eq!(Operation::Parse.path(), "/upload");
        assert_eq!(Operation::Analyze.path(), "/analyze");
        assert_eq!(serde_json::to_value(Operation::Parse).unwrap(), json!("parse"));
        assert_eq!(
            serde_json::to_value(Operation::Analyze).unwrap(),
            json!("analysis")
        );
        assert_eq!(Operation::Analyze.tag(), "analysis");
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(
            spreadsheet_mime("Report.XLSX"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(spreadsheet_mime("old.xls"), "application/vnd.ms-excel");
        assert_eq!(spreadsheet_mime("data.csv"), "application/octet-stream");
    }
}
