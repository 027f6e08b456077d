//! Newline-delimited JSON status stream consumed by the calling process.
//!
//! Every event is serialized on its own line and flushed straight away so a
//! parent reading the pipe incrementally sees updates as they happen.

use serde::{Serialize, Serializer};
use std::io::Write;

use crate::error::Result;

pub const STATUS_STARTING: &str = "starting";
pub const STATUS_PACKAGE_READY: &str = "translation package ready";
pub const STATUS_TRANSLATING: &str = "translating";
pub const STATUS_WRITING: &str = "writing output";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ERROR: &str = "error";

/// A single record on the status stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProgressEvent {
    Progress {
        #[serde(serialize_with = "serialize_percent")]
        progress: f64,
        status: String,
    },
    Error {
        status: String,
        message: String,
    },
    InvalidArguments {
        error: String,
        usage: String,
    },
}

impl ProgressEvent {
    pub fn progress<S: Into<String>>(progress: f64, status: S) -> Self {
        Self::Progress {
            progress: round_percent(progress),
            status: status.into(),
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::Error {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_arguments<S: Into<String>>(usage: S) -> Self {
        Self::InvalidArguments {
            error: "Invalid arguments".to_string(),
            usage: usage.into(),
        }
    }
}

/// Round to two decimals, clamped to the 0..=100 range
fn round_percent(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

// Whole percentages go out as integers so callers see `5`, not `5.0`
fn serialize_percent<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if value.fract() == 0.0 {
        serializer.serialize_u64(*value as u64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Writes progress events to any byte sink, one JSON object per line
pub struct ProgressReporter<W: Write> {
    writer: W,
}

impl ProgressReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn emit(&mut self, event: &ProgressEvent) -> Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn report<S: Into<String>>(&mut self, progress: f64, status: S) -> Result<()> {
        self.emit(&ProgressEvent::progress(progress, status))
    }

    pub fn report_error<S: Into<String>>(&mut self, message: S) -> Result<()> {
        self.emit(&ProgressEvent::error(message))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
