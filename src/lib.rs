//! repofix: batch source-repair for generated Go repository code.
//!
//! Rewrites a fixed list of per-entity source files so the concrete storage
//! type no longer shares a name with its contract interface, wires in the
//! contract package import, drops stale compile-time assertions, repairs
//! mixed encodings, and migrates legacy test-fixture literals.

// Core engine - re-exported from repofix-core
pub use repofix_core::assertions;
pub use repofix_core::batch;
pub use repofix_core::config;
pub use repofix_core::diff;
pub use repofix_core::encoding;
pub use repofix_core::error;
pub use repofix_core::files;
pub use repofix_core::fixtures;
pub use repofix_core::imports;
pub use repofix_core::names;
pub use repofix_core::output;
pub use repofix_core::rules;
pub use repofix_core::text;
pub use repofix_core::unit;

// Front door
pub mod cli;
