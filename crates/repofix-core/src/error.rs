//! Error types and error code constants for repofix.
//!
//! This module provides a unified error type (`FixError`) covering every
//! failure a unit can hit while it is resolved, decoded, rewritten and
//! persisted, plus the configuration and argument errors raised by the
//! front door before any unit is touched.
//!
//! ## Error Code Mapping
//!
//! Exit codes:
//! - `2`: Invalid arguments or configuration (bad input from caller)
//! - `3`: Resolution errors (no candidate file for a unit)
//! - `4`: Read/decode errors (file could not be turned into text)
//! - `5`: Write errors (file system rejected the write)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Unit-level errors never reach the process exit code: the batch driver
//! catches them at the unit boundary and reports them as status lines.
//! Only errors raised before the batch starts map to a non-zero exit.
//!
//! ## Informational errors
//!
//! `PatternNotMatched` exists so that zero-match rules can be reported with
//! the same vocabulary as real failures. It is never fatal; see
//! [`FixError::is_fatal`].

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Numeric codes used as process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments or configuration from caller.
    InvalidArguments = 2,
    /// No candidate file could be resolved.
    ResolutionError = 3,
    /// File could not be read or decoded.
    ReadError = 4,
    /// File could not be written.
    WriteError = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Error Kind (stable string codes)
// ============================================================================

/// Stable, serializable classification of a [`FixError`].
///
/// Appears in JSON unit reports and in `[ERROR]` status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    DecodeFailure,
    PatternNotMatched,
    WriteFailure,
    ReadFailure,
    InvalidConfig,
    InvalidArguments,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::DecodeFailure => "DecodeFailure",
            ErrorKind::PatternNotMatched => "PatternNotMatched",
            ErrorKind::WriteFailure => "WriteFailure",
            ErrorKind::ReadFailure => "ReadFailure",
            ErrorKind::InvalidConfig => "InvalidConfig",
            ErrorKind::InvalidArguments => "InvalidArguments",
            ErrorKind::Internal => "Internal",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the engine and the CLI front door.
#[derive(Debug, Error)]
pub enum FixError {
    /// No candidate path exists on disk for a unit.
    #[error("no file found for unit '{unit}' (tried {})", display_paths(.tried))]
    NotFound { unit: String, tried: Vec<PathBuf> },

    /// Every candidate encoding failed to decode the file.
    #[error("cannot decode {path} (tried {})", .tried.join(", "))]
    DecodeFailure { path: PathBuf, tried: Vec<String> },

    /// A rule, anchor or strip pattern matched nothing. Informational only.
    #[error("pattern not matched: {rule}")]
    PatternNotMatched { rule: String },

    /// The file system rejected a write.
    #[error("failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file is malformed or names something unknown.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result alias used throughout the engine.
pub type FixResult<T> = Result<T, FixError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&FixError> for ErrorKind {
    fn from(err: &FixError) -> Self {
        match err {
            FixError::NotFound { .. } => ErrorKind::NotFound,
            FixError::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            FixError::PatternNotMatched { .. } => ErrorKind::PatternNotMatched,
            FixError::WriteFailure { .. } => ErrorKind::WriteFailure,
            FixError::ReadFailure { .. } => ErrorKind::ReadFailure,
            FixError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            FixError::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            FixError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

impl From<&FixError> for OutputErrorCode {
    fn from(err: &FixError) -> Self {
        match err {
            FixError::InvalidConfig { .. } => OutputErrorCode::InvalidArguments,
            FixError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            FixError::NotFound { .. } => OutputErrorCode::ResolutionError,
            FixError::DecodeFailure { .. } => OutputErrorCode::ReadError,
            FixError::ReadFailure { .. } => OutputErrorCode::ReadError,
            FixError::WriteFailure { .. } => OutputErrorCode::WriteError,
            FixError::PatternNotMatched { .. } => OutputErrorCode::InternalError,
            FixError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<FixError> for OutputErrorCode {
    fn from(err: FixError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl FixError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        FixError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        FixError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a pattern-not-matched note for the named rule.
    pub fn pattern_not_matched(rule: impl Into<String>) -> Self {
        FixError::PatternNotMatched { rule: rule.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        FixError::Internal {
            message: message.into(),
        }
    }

    /// Stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from(self)
    }

    /// Get the exit code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// Whether this error means the unit failed.
    ///
    /// Only `PatternNotMatched` is non-fatal: idempotent re-runs produce it
    /// legitimately.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FixError::PatternNotMatched { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn not_found_maps_to_resolution_error() {
            let err = FixError::NotFound {
                unit: "role".to_string(),
                tried: vec![PathBuf::from("a.go")],
            };
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::ResolutionError);
            assert_eq!(err.error_code().code(), 3);
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }

        #[test]
        fn decode_failure_maps_to_read_error() {
            let err = FixError::DecodeFailure {
                path: PathBuf::from("x.go"),
                tried: vec!["utf-8".to_string()],
            };
            assert_eq!(err.error_code(), OutputErrorCode::ReadError);
            assert_eq!(err.kind(), ErrorKind::DecodeFailure);
        }

        #[test]
        fn write_failure_maps_to_write_error() {
            let err = FixError::WriteFailure {
                path: PathBuf::from("x.go"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            };
            assert_eq!(err.error_code().code(), 5);
        }

        #[test]
        fn config_and_arguments_map_to_invalid_arguments() {
            assert_eq!(
                FixError::invalid_config("bad").error_code(),
                OutputErrorCode::InvalidArguments
            );
            assert_eq!(
                FixError::invalid_args("bad").error_code(),
                OutputErrorCode::InvalidArguments
            );
        }
    }

    mod fatality {
        use super::*;

        #[test]
        fn pattern_not_matched_is_not_fatal() {
            assert!(!FixError::pattern_not_matched("declaration-rename").is_fatal());
        }

        #[test]
        fn resolution_and_io_errors_are_fatal() {
            let err = FixError::NotFound {
                unit: "x".to_string(),
                tried: vec![],
            };
            assert!(err.is_fatal());
            assert!(FixError::internal("boom").is_fatal());
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn not_found_lists_candidates() {
            let err = FixError::NotFound {
                unit: "operation_log".to_string(),
                tried: vec![PathBuf::from("a/b.go"), PathBuf::from("a/c.go")],
            };
            assert_eq!(
                err.to_string(),
                "no file found for unit 'operation_log' (tried a/b.go, a/c.go)"
            );
        }

        #[test]
        fn decode_failure_lists_encodings() {
            let err = FixError::DecodeFailure {
                path: PathBuf::from("x.go"),
                tried: vec!["utf-8".to_string(), "gbk".to_string()],
            };
            assert_eq!(err.to_string(), "cannot decode x.go (tried utf-8, gbk)");
        }

        #[test]
        fn kind_display_is_stable() {
            assert_eq!(ErrorKind::PatternNotMatched.to_string(), "PatternNotMatched");
            assert_eq!(ErrorKind::WriteFailure.to_string(), "WriteFailure");
        }
    }
}
