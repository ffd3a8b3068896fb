//! Test-fixture literal rewriter.
//!
//! Model changes turned `PriceCents` into a unit/total pair and made
//! `PlayerID`/`GameID` optional pointers. Test files still build models with
//! the old literal shapes; this module rewrites them with a fixed table and
//! makes sure the pointer helper they now call is defined. The helper is
//! appended after the last declaration so it never lands ahead of the
//! import block.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use walkdir::WalkDir;

use crate::config::FixtureConfig;
use crate::error::{FixError, FixResult};
use crate::rules::{RewriteReport, RewriteRule, RuleSet};

/// Fixture rules plus helper injection.
#[derive(Debug, Clone)]
pub struct FixtureRewriter {
    rules: RuleSet,
    helper_name: String,
}

/// Result of rewriting one fixture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureEdit {
    pub report: RewriteReport,
    pub helper_injected: bool,
}

impl FixtureRewriter {
    pub fn new(helper_name: &str) -> FixResult<Self> {
        let helper = helper_name.replace('$', "$$");
        let rules = RuleSet::new(vec![
            RewriteRule::new(
                "price-cents",
                r"\bPriceCents:\s*(\d+)",
                "UnitPriceCents: ${1}, TotalPriceCents: ${1}",
            )?,
            RewriteRule::new(
                "player-id",
                r"\bPlayerID:\s*(\d+)",
                format!("PlayerID: {helper}(${{1}})"),
            )?,
            RewriteRule::new(
                "game-id",
                r"\bGameID:\s*(\d+)",
                format!("GameID: {helper}(${{1}})"),
            )?,
        ]);
        Ok(FixtureRewriter {
            rules,
            helper_name: helper_name.to_string(),
        })
    }

    fn helper_source(&self) -> String {
        format!(
            "\n// {name} returns a pointer to v.\nfunc {name}(v uint64) *uint64 {{ return &v }}\n",
            name = self.helper_name
        )
    }

    /// Rewrite one file's content.
    pub fn rewrite(&self, content: &str) -> FixtureEdit {
        let mut report = self.rules.apply(content);
        let mut helper_injected = false;

        let needs_helper = report.content != content
            && report.content.contains(&self.helper_name)
            && !report.content.contains(&format!("func {}", self.helper_name));
        if needs_helper {
            if !report.content.is_empty() && !report.content.ends_with('\n') {
                report.content.push('\n');
            }
            report.content.push_str(&self.helper_source());
            helper_injected = true;
        }

        FixtureEdit {
            report,
            helper_injected,
        }
    }
}

/// Files under `<base>/<root>` whose root-relative path matches the glob,
/// in a stable order.
pub fn collect_fixture_files(base: &Path, config: &FixtureConfig) -> FixResult<Vec<PathBuf>> {
    let matcher: GlobMatcher = Glob::new(&config.pattern)
        .map_err(|e| FixError::invalid_config(format!("fixture pattern: {}", e)))?
        .compile_matcher();
    let root = base.join(&config.root);
    if !root.is_dir() {
        tracing::warn!("fixture root {} does not exist", root.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.map_err(|e| FixError::ReadFailure {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
        if matcher.is_match(relative) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
