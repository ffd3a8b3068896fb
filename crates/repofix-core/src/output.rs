//! Output types for CLI responses.
//!
//! Two renderings of the same [`BatchSummary`]:
//!
//! - **JSON**: a [`BatchResponse`] with a schema version, one object per
//!   target, and the success tally.
//! - **Text**: one status line per target (`[OK] role: ...`), the unified
//!   diff under each changed target on dry runs, and a closing
//!   `Processed <successes>/<total> units` line.
//!
//! Errors that stop a run before any unit is processed are rendered as an
//! [`ErrorResponse`].

use std::io::{self, Write};

use serde::Serialize;

use crate::batch::{BatchSummary, TargetKind, TargetReport};
use crate::error::{ErrorKind, FixError, OutputErrorCode};

/// Current schema version for JSON output.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Information
// ============================================================================

/// Error details carried by a failed target or an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// Error classification.
    pub kind: ErrorKind,
    /// Numeric exit-code class.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Create from a FixError.
    pub fn from_error(err: &FixError) -> Self {
        ErrorInfo {
            kind: err.kind(),
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response for a completed batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse<'a> {
    /// Status: "ok". The batch ran to completion even if some targets failed.
    pub status: &'static str,
    /// Schema version for compatibility.
    pub schema_version: &'static str,
    #[serde(flatten)]
    pub summary: &'a BatchSummary,
}

impl<'a> BatchResponse<'a> {
    pub fn new(summary: &'a BatchSummary) -> Self {
        BatchResponse {
            status: "ok",
            schema_version: SCHEMA_VERSION,
            summary,
        }
    }
}

/// Response for a run that failed before processing any target.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &FixError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// `[STATUS] target: message`.
pub fn status_line(report: &TargetReport) -> String {
    format!(
        "[{}] {}: {}",
        report.status.label(),
        report.target,
        report.message
    )
}

/// Final tally line.
pub fn summary_line(summary: &BatchSummary) -> String {
    let line = format!(
        "Processed {}/{} {}",
        summary.successes,
        summary.total,
        summary.target_kind.plural()
    );
    match summary.target_kind {
        TargetKind::Unit => line,
        TargetKind::File => format!("{}, {} literal(s) fixed", line, summary.rewrites),
    }
}

/// Render a batch as human-readable text.
pub fn render_text(summary: &BatchSummary, writer: &mut impl Write) -> io::Result<()> {
    for report in &summary.targets {
        writeln!(writer, "{}", status_line(report))?;
        if let Some(diff) = report.diff.as_deref().filter(|d| !d.is_empty()) {
            write!(writer, "{}", diff)?;
        }
    }
    if summary.dry_run {
        writeln!(writer, "(dry run: no files written)")?;
    }
    writeln!(writer, "{}", summary_line(summary))
}
