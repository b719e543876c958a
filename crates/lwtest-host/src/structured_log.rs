//! Structured JSONL logging for host runs.
//!
//! Provides:
//! - [`LogEntry`]: one JSONL record with required + optional fields.
//! - [`LogEmitter`]: writes records to a file, an arbitrary writer, or nowhere.
//! - [`validate_log_line`]: checks a single JSONL line against the schema.
//!
//! Records go to a side channel; the `HOST:` lines on stdout never change
//! with logging on or off.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    /// Host program name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// `fullpath` or `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Library path or bare name handed to the loader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<i32>,
    /// `errno` / `GetLastError()` of a failed loader call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: lwtest_core::time::now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            host: None,
            mode: None,
            target: None,
            symbol: None,
            fixture_id: None,
            os_code: None,
            exit_code: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_fixture_id(mut self, id: i32) -> Self {
        self.fixture_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_os_code(mut self, code: i32) -> Self {
        self.os_code = Some(code);
        self
    }

    #[must_use]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Writes JSONL records and numbers them `<host>::<run_id>::<seq>`.
pub struct LogEmitter {
    writer: Option<Box<dyn Write>>,
    seq: u64,
    host: String,
    run_id: String,
}

impl LogEmitter {
    /// Create an emitter that appends to a file, creating it if needed.
    pub fn to_file(path: &Path, host: &str, run_id: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::to_writer(Box::new(file), host, run_id))
    }

    /// Create an emitter over any writer.
    #[must_use]
    pub fn to_writer(writer: Box<dyn Write>, host: &str, run_id: &str) -> Self {
        Self {
            writer: Some(writer),
            seq: 0,
            host: host.to_string(),
            run_id: run_id.to_string(),
        }
    }

    /// Create an emitter that drops every record.
    #[must_use]
    pub fn disabled(host: &str) -> Self {
        Self {
            writer: None,
            seq: 0,
            host: host.to_string(),
            run_id: String::new(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{}::{:03}", self.host, self.run_id, self.seq)
    }

    /// Start a record for this emitter's host with a fresh trace id.
    #[must_use]
    pub fn entry(&mut self, level: LogLevel, event: &str) -> LogEntry {
        let trace_id = self.next_trace_id();
        let mut entry = LogEntry::new(trace_id, level, event);
        entry.host = Some(self.host.clone());
        entry
    }

    /// Write a fully-populated log entry. A disabled emitter accepts and
    /// drops it.
    pub fn emit_entry(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A schema violation found in a JSONL line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line_number}: {field}: {message}")]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let error = |field: &str, message: String| LogValidationError {
        line_number,
        field: field.to_string(),
        message,
    };

    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| vec![error("<json>", format!("invalid JSON: {e}"))])?;
    let Some(obj) = value.as_object() else {
        return Err(vec![error("<root>", "expected JSON object".to_string())]);
    };

    let mut errors = Vec::new();
    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            errors.push(error(field, "required field missing".to_string()));
        }
    }
    if let Some(level) = obj.get("level").and_then(|v| v.as_str())
        && !["info", "warn", "error"].contains(&level)
    {
        errors.push(error("level", format!("invalid level: '{level}'")));
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(value).map_err(|e| vec![error("<schema>", e.to_string())])
}
