//! Core engine for repofix.
//!
//! This crate provides the batch source-repair engine:
//! - Identifier derivation and unit path resolution
//! - Encoding normalization with a known repair table
//! - Anchored, idempotent rewrite rules
//! - Import injection and interface-assertion stripping
//! - Test-fixture literal rewriting
//! - Atomic persistence and dry-run diffs
//! - Error types, configuration, and JSON/text output

pub mod assertions;
pub mod batch;
pub mod config;
pub mod diff;
pub mod encoding;
pub mod error;
pub mod files;
pub mod fixtures;
pub mod imports;
pub mod names;
pub mod output;
pub mod rules;
pub mod text;
pub mod unit;
