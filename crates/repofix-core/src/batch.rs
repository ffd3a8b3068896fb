//! Batch driver: run one operation over every configured unit.
//!
//! For each unit the driver resolves the file, decodes it (optionally through
//! the encoding normalizer), runs the operation's steps in memory, and
//! persists the result once. Failures are caught at the unit boundary and
//! turned into an `ERROR` report; the batch always runs to completion.
//!
//! ## Step order for `all`
//!
//! normalize → collision rules → contract qualify → import → assertions
//!
//! Contract qualification runs after the collision rules because it only
//! matches the bare return type those rules produce.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assertions::{AssertionStripper, StripReport};
use crate::config::FixConfig;
use crate::diff::unified_diff;
use crate::encoding::{decode_with_priority, normalize, SourceEncoding};
use crate::error::{FixError, FixResult};
use crate::files::{read_file, write_atomic};
use crate::fixtures::{collect_fixture_files, FixtureRewriter};
use crate::imports::{inject_import, InjectOutcome};
use crate::names::IdentifierPair;
use crate::output::ErrorInfo;
use crate::rules::{RuleOutcome, RuleSet};
use crate::unit::UnitSpec;

// ============================================================================
// Operations and Options
// ============================================================================

/// A unit-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Rename the concrete type off the interface name.
    FixNames,
    /// Ensure the contract package is imported.
    AddImport,
    /// Remove compile-time interface assertions.
    StripAssertions,
    /// Normalize encoding and qualify constructor return types.
    FixEncoding,
    /// Every step above, persisted once.
    All,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::FixNames => "fix-names",
            Operation::AddImport => "add-import",
            Operation::StripAssertions => "strip-assertions",
            Operation::FixEncoding => "fix-encoding",
            Operation::All => "all",
        }
    }

    fn normalizes(self) -> bool {
        matches!(self, Operation::FixEncoding | Operation::All)
    }
}

/// Knobs that apply to a whole batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory every template is resolved against.
    pub base: PathBuf,
    /// Compute results and diffs without writing.
    pub dry_run: bool,
    /// Run the encoding normalizer before operations that do not imply it.
    pub normalize: bool,
}

impl BatchOptions {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        BatchOptions {
            base: base.into(),
            dry_run: false,
            normalize: false,
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Per-target status, printed as `[OK]`, `[SKIP]`, `[WARN]`, `[ERROR]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitStatus {
    /// Changes were made.
    Ok,
    /// Nothing to do; already in the target shape.
    Skip,
    /// Soft failure; the file was not fully processed.
    Warn,
    /// Hard failure.
    Error,
}

impl UnitStatus {
    pub fn label(self) -> &'static str {
        match self {
            UnitStatus::Ok => "OK",
            UnitStatus::Skip => "SKIP",
            UnitStatus::Warn => "WARN",
            UnitStatus::Error => "ERROR",
        }
    }

    /// Whether the target counts toward the success tally.
    pub fn is_success(self) -> bool {
        matches!(self, UnitStatus::Ok | UnitStatus::Skip)
    }

    /// Combine step statuses: the worst wins, and any change beats a skip.
    fn merge(self, other: UnitStatus) -> UnitStatus {
        fn rank(status: UnitStatus) -> u8 {
            match status {
                UnitStatus::Skip => 0,
                UnitStatus::Ok => 1,
                UnitStatus::Warn => 2,
                UnitStatus::Error => 3,
            }
        }
        if rank(other) > rank(self) {
            other
        } else {
            self
        }
    }
}

/// What happened to one unit or fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    /// Unit name, or the fixture file path.
    pub target: String,
    pub status: UnitStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<IdentifierPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<SourceEncoding>,
    #[serde(skip_serializing_if = "is_zero")]
    pub repairs: usize,
    /// CRLF or lone CR line endings were rewritten to LF.
    #[serde(skip_serializing_if = "is_false")]
    pub line_endings_normalized: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<InjectOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripped: Option<StripReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TargetReport {
    fn new(target: impl Into<String>) -> Self {
        TargetReport {
            target: target.into(),
            status: UnitStatus::Skip,
            message: String::new(),
            path: None,
            identifiers: None,
            encoding: None,
            repairs: 0,
            line_endings_normalized: false,
            rules: Vec::new(),
            import: None,
            stripped: None,
            notes: Vec::new(),
            written: false,
            diff: None,
            error: None,
        }
    }

    fn fail(&mut self, err: &FixError) {
        self.status = UnitStatus::Error;
        self.message = err.to_string();
        self.error = Some(ErrorInfo::from_error(err));
    }

    fn note(&mut self, err: FixError) {
        self.notes.push(err.to_string());
    }
}

/// What a whole batch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Unit,
    File,
}

impl TargetKind {
    pub fn plural(self) -> &'static str {
        match self {
            TargetKind::Unit => "units",
            TargetKind::File => "files",
        }
    }
}

/// Aggregated batch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub operation: String,
    pub target_kind: TargetKind,
    pub dry_run: bool,
    pub targets: Vec<TargetReport>,
    pub successes: usize,
    pub total: usize,
    /// Rule matches across every target.
    pub rewrites: usize,
}

impl BatchSummary {
    fn new(
        operation: &str,
        target_kind: TargetKind,
        dry_run: bool,
        targets: Vec<TargetReport>,
    ) -> Self {
        let successes = targets.iter().filter(|t| t.status.is_success()).count();
        let total = targets.len();
        let rewrites = targets
            .iter()
            .flat_map(|t| t.rules.iter())
            .map(|o| o.matches)
            .sum();
        BatchSummary {
            operation: operation.to_string(),
            target_kind,
            dry_run,
            targets,
            successes,
            total,
            rewrites,
        }
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Runs operations over units with one configuration.
#[derive(Debug)]
pub struct BatchDriver<'a> {
    config: &'a FixConfig,
    encodings: Vec<SourceEncoding>,
    stripper: AssertionStripper,
    qualify: RuleSet,
    options: BatchOptions,
}

/// One step's verdict and its contribution to the status line.
type StepResult = FixResult<(UnitStatus, String)>;

impl<'a> BatchDriver<'a> {
    pub fn new(config: &'a FixConfig, options: BatchOptions) -> FixResult<Self> {
        Ok(BatchDriver {
            config,
            encodings: config.encodings()?,
            stripper: AssertionStripper::new(&config.contract_package)?,
            qualify: RuleSet::contract_qualify(&config.interface_suffix, &config.contract_package)?,
            options,
        })
    }

    /// Run `op` over `units` in order.
    pub fn run(&self, op: Operation, units: &[UnitSpec]) -> BatchSummary {
        tracing::info!("running {} over {} unit(s)", op.name(), units.len());
        let targets = units
            .iter()
            .map(|spec| self.process_unit(op, spec))
            .collect();
        BatchSummary::new(op.name(), TargetKind::Unit, self.options.dry_run, targets)
    }

    /// Rewrite every fixture file matched by the fixture configuration.
    pub fn run_fixtures(&self) -> FixResult<BatchSummary> {
        let rewriter = FixtureRewriter::new(&self.config.fixtures.helper_name)?;
        let files = collect_fixture_files(&self.options.base, &self.config.fixtures)?;
        tracing::info!("rewriting {} fixture file(s)", files.len());
        let targets = files
            .iter()
            .map(|path| self.process_fixture(&rewriter, path))
            .collect();
        Ok(BatchSummary::new(
            "fix-fixtures",
            TargetKind::File,
            self.options.dry_run,
            targets,
        ))
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.options.base)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    fn process_unit(&self, op: Operation, spec: &UnitSpec) -> TargetReport {
        let span = tracing::info_span!("unit", unit = spec.name());
        let _enter = span.enter();

        let mut report = TargetReport::new(spec.name());
        match self.try_process_unit(op, spec, &mut report) {
            Ok(()) => {}
            Err(err) if !err.is_fatal() => report.note(err),
            Err(err) => {
                tracing::warn!("{}", err);
                report.fail(&err);
            }
        }
        report
    }

    fn try_process_unit(
        &self,
        op: Operation,
        spec: &UnitSpec,
        report: &mut TargetReport,
    ) -> FixResult<()> {
        let path = spec.resolve(&self.options.base)?;
        report.path = Some(self.display_path(&path));
        let bytes = read_file(&path)?;

        let normalizing = op.normalizes() || self.options.normalize;
        let mut text = if normalizing {
            let normalized = normalize(&path, &bytes, &self.encodings)?;
            report.encoding = Some(normalized.encoding);
            report.repairs = normalized.repairs;
            report.line_endings_normalized = normalized.line_endings_changed;
            normalized.text
        } else {
            let (text, encoding) = decode_with_priority(&path, &bytes, &[SourceEncoding::Utf8])?;
            report.encoding = Some(encoding);
            text
        };

        let mut steps = Vec::new();
        match op {
            Operation::FixNames => {
                steps.push(self.step_names(spec, &mut text, report)?);
            }
            Operation::AddImport => steps.push(self.step_import(&mut text, report)),
            Operation::StripAssertions => steps.push(self.step_strip(&mut text, report)),
            Operation::FixEncoding => {
                steps.push(self.step_qualify(&mut text, report));
            }
            Operation::All => {
                steps.push(self.step_names(spec, &mut text, report)?);
                steps.push(self.step_qualify(&mut text, report));
                steps.push(self.step_import(&mut text, report));
                steps.push(self.step_strip(&mut text, report));
            }
        }

        let new_bytes = text.into_bytes();
        let changed = new_bytes != bytes;

        let mut status = steps
            .iter()
            .fold(UnitStatus::Skip, |acc, (status, _)| acc.merge(*status));
        if changed && status == UnitStatus::Skip {
            status = UnitStatus::Ok;
        }
        let mut parts: Vec<String> = steps.into_iter().map(|(_, message)| message).collect();
        if normalizing {
            parts.insert(0, self.encoding_message(report, changed));
        }
        report.status = status;
        report.message = parts.join("; ");

        if self.options.dry_run {
            if changed {
                let old = String::from_utf8_lossy(&bytes);
                let new = String::from_utf8_lossy(&new_bytes);
                report.diff = Some(unified_diff(&self.display_path(&path), &old, &new));
            }
        } else if changed || normalizing {
            write_atomic(&path, &new_bytes)?;
            report.written = true;
        }
        Ok(())
    }

    fn encoding_message(&self, report: &TargetReport, changed: bool) -> String {
        let label = report.encoding.map(|e| e.label()).unwrap_or("unknown");
        let mut message = format!("decoded as {}", label);
        if report.repairs > 0 {
            message.push_str(&format!(", {} repair(s)", report.repairs));
        }
        if report.line_endings_normalized {
            message.push_str(", line endings normalized");
        }
        if !changed {
            message.push_str(", already canonical");
        }
        message
    }

    fn step_names(
        &self,
        spec: &UnitSpec,
        text: &mut String,
        report: &mut TargetReport,
    ) -> StepResult {
        let pair = IdentifierPair::derive(
            spec.name(),
            &self.config.interface_suffix,
            &self.config.implementation_prefix,
        )
        .ok_or_else(|| {
            FixError::invalid_config(format!("unit '{}' has no name segments", spec.name()))
        })?;

        let rewrite = RuleSet::collision_rules(&pair)?.apply(text);
        let matches = rewrite.total_matches();
        for note in rewrite.notes() {
            report.note(note);
        }
        *text = rewrite.content;
        report.rules.extend(rewrite.outcomes);

        let result = if matches == 0 {
            (
                UnitStatus::Skip,
                format!("{} -> {} already migrated", pair.interface, pair.implementation),
            )
        } else {
            (
                UnitStatus::Ok,
                format!(
                    "{} -> {} ({} rewrites)",
                    pair.interface, pair.implementation, matches
                ),
            )
        };
        report.identifiers = Some(pair);
        Ok(result)
    }

    fn step_qualify(&self, text: &mut String, report: &mut TargetReport) -> (UnitStatus, String) {
        let rewrite = self.qualify.apply(text);
        let matches = rewrite.total_matches();
        for note in rewrite.notes() {
            report.note(note);
        }
        *text = rewrite.content;
        report.rules.extend(rewrite.outcomes);

        if matches == 0 {
            (UnitStatus::Skip, "constructors already qualified".to_string())
        } else {
            (
                UnitStatus::Ok,
                format!(
                    "qualified {} constructor(s) with {}.",
                    matches, self.config.contract_package
                ),
            )
        }
    }

    fn step_import(&self, text: &mut String, report: &mut TargetReport) -> (UnitStatus, String) {
        let spec = &self.config.import;
        let (content, outcome) = inject_import(text, spec);
        let content = content.into_owned();
        *text = content;
        report.import = Some(outcome);

        match outcome {
            InjectOutcome::AlreadyPresent => (
                UnitStatus::Skip,
                format!("already imports \"{}\"", spec.path),
            ),
            InjectOutcome::AfterAnchor { .. } => {
                (UnitStatus::Ok, format!("added import \"{}\"", spec.path))
            }
            InjectOutcome::BeforeClose { .. } => {
                report.note(FixError::pattern_not_matched(format!(
                    "import anchor \"{}\"",
                    spec.anchor
                )));
                (
                    UnitStatus::Ok,
                    format!(
                        "added import \"{}\" before closing delimiter (no \"{}\" import)",
                        spec.path, spec.anchor
                    ),
                )
            }
            InjectOutcome::NoInsertionPoint => {
                report.note(FixError::pattern_not_matched("import block"));
                (
                    UnitStatus::Warn,
                    format!("no import block; \"{}\" not added", spec.path),
                )
            }
        }
    }

    fn step_strip(&self, text: &mut String, report: &mut TargetReport) -> (UnitStatus, String) {
        let (content, strip) = self.stripper.strip(text);
        let content = content.into_owned();
        *text = content;

        let result = if strip.removed == 0 {
            report.note(FixError::pattern_not_matched("interface assertion"));
            (UnitStatus::Skip, "no interface assertions".to_string())
        } else {
            (
                UnitStatus::Ok,
                format!("removed {} interface assertion(s)", strip.removed),
            )
        };
        report.stripped = Some(strip);
        result
    }

    fn process_fixture(&self, rewriter: &FixtureRewriter, path: &Path) -> TargetReport {
        let shown = self.display_path(path);
        let span = tracing::info_span!("fixture", file = %shown);
        let _enter = span.enter();

        let mut report = TargetReport::new(shown);
        match self.try_process_fixture(rewriter, path, &mut report) {
            Ok(()) => {}
            Err(err) if !err.is_fatal() => report.note(err),
            Err(err) => {
                tracing::warn!("{}", err);
                report.fail(&err);
            }
        }
        report
    }

    fn try_process_fixture(
        &self,
        rewriter: &FixtureRewriter,
        path: &Path,
        report: &mut TargetReport,
    ) -> FixResult<()> {
        let bytes = read_file(path)?;
        let (text, encoding) = decode_with_priority(path, &bytes, &[SourceEncoding::Utf8])?;
        report.encoding = Some(encoding);

        let edit = rewriter.rewrite(&text);
        let fixes = edit.report.total_matches();
        report.rules = edit
            .report
            .outcomes
            .into_iter()
            .filter(|o| o.matches > 0)
            .collect();

        if edit.report.content == text {
            report.status = UnitStatus::Skip;
            report.message = "no legacy fixture literals".to_string();
            return Ok(());
        }

        let breakdown = report
            .rules
            .iter()
            .map(|o| format!("{} x{}", o.rule, o.matches))
            .collect::<Vec<_>>()
            .join(", ");
        report.status = UnitStatus::Ok;
        report.message = format!("fixed {} literal(s): {}", fixes, breakdown);
        if edit.helper_injected {
            report
                .message
                .push_str(&format!("; added {} helper", self.config.fixtures.helper_name));
        }

        if self.options.dry_run {
            report.diff = Some(unified_diff(&report.target, &text, &edit.report.content));
        } else {
            write_atomic(path, edit.report.content.as_bytes())?;
            report.written = true;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ROLE_SOURCE: &str = "\
package role

import (
\t\"context\"

\t\"gorm.io/gorm\"

\t\"gamelink/internal/model\"
)

// RoleRepository manages roles.
type RoleRepository struct {
\tdb *gorm.DB
}

// NewRoleRepository creates an instance.
func NewRoleRepository(db *gorm.DB) *RoleRepository {
\treturn &RoleRepository{db: db}
}

func (r *RoleRepository) List(ctx context.Context) ([]model.RoleModel, error) {
\treturn nil, nil
}

var _ repository.RoleRepository = (*RoleRepository)(nil)
";

    fn write(base: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn role_workspace() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "internal/repository/role/role_gorm_repository.go",
            ROLE_SOURCE.as_bytes(),
        );
        (temp, path)
    }

    fn units(config: &FixConfig, names: &[&str]) -> Vec<UnitSpec> {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        config.unit_specs(&names).unwrap()
    }

    mod unit_operations {
        use super::*;

        #[test]
        fn fix_names_rewrites_and_persists() {
            let (temp, path) = role_workspace();
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();

            let summary = driver.run(Operation::FixNames, &units(&config, &["role"]));
            assert_eq!(summary.successes, 1);
            let report = &summary.targets[0];
            assert_eq!(report.status, UnitStatus::Ok);
            assert_eq!(report.message, "RoleRepository -> gormRoleRepository (4 rewrites)");
            assert!(report.written);

            let content = fs::read_to_string(&path).unwrap();
            assert!(content.contains("type gormRoleRepository struct"));
            assert!(content.contains("func NewRoleRepository(db *gorm.DB) RoleRepository {"));
        }

        #[test]
        fn fix_names_twice_skips_second_time() {
            let (temp, path) = role_workspace();
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();
            let specs = units(&config, &["role"]);

            driver.run(Operation::FixNames, &specs);
            let after_first = fs::read(&path).unwrap();
            let second = driver.run(Operation::FixNames, &specs);

            assert_eq!(second.targets[0].status, UnitStatus::Skip);
            assert!(!second.targets[0].written);
            assert_eq!(second.targets[0].notes.len(), 4);
            assert_eq!(fs::read(&path).unwrap(), after_first);
        }

        #[test]
        fn add_import_skips_when_present() {
            let temp = TempDir::new().unwrap();
            let source = "package role\n\nimport (\n\t\"gamelink/internal/repository\"\n)\n";
            let path = write(
                temp.path(),
                "internal/repository/role/role_gorm_repository.go",
                source.as_bytes(),
            );
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();

            let summary = driver.run(Operation::AddImport, &units(&config, &["role"]));
            assert_eq!(summary.targets[0].status, UnitStatus::Skip);
            assert_eq!(fs::read_to_string(&path).unwrap(), source);
        }

        #[test]
        fn add_import_without_block_warns_and_counts_as_failure() {
            let temp = TempDir::new().unwrap();
            write(
                temp.path(),
                "internal/repository/role/role_gorm_repository.go",
                b"package role\n\nimport \"fmt\"\n",
            );
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();

            let summary = driver.run(Operation::AddImport, &units(&config, &["role"]));
            assert_eq!(summary.targets[0].status, UnitStatus::Warn);
            assert_eq!(summary.successes, 0);
        }

        #[test]
        fn strip_assertions_reports_count() {
            let (temp, path) = role_workspace();
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();

            let summary = driver.run(Operation::StripAssertions, &units(&config, &["role"]));
            let report = &summary.targets[0];
            assert_eq!(report.status, UnitStatus::Ok);
            assert_eq!(report.stripped.as_ref().unwrap().removed, 1);
            let content = fs::read_to_string(&path).unwrap();
            assert!(!content.contains("var _ repository."));
            assert!(content.ends_with("return nil, nil\n}\n"));
        }

        #[test]
        fn fix_encoding_repairs_and_always_writes() {
            let temp = TempDir::new().unwrap();
            let mut bytes = b"package role\r\n// \xd6\xd0\r\n".to_vec();
            bytes.extend_from_slice(b"func NewRoleRepository(db *gorm.DB) RoleRepository {\r\n");
            let path = write(
                temp.path(),
                "internal/repository/role/role_gorm_repository.go",
                &bytes,
            );
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();

            let summary = driver.run(Operation::FixEncoding, &units(&config, &["role"]));
            let report = &summary.targets[0];
            assert_eq!(report.status, UnitStatus::Ok);
            assert_eq!(report.encoding, Some(SourceEncoding::Gb2312));
            assert!(report.line_endings_normalized);
            assert!(report.message.contains("line endings normalized"));
            assert_eq!(
                fs::read_to_string(&path).unwrap(),
                "package role\n// 中\nfunc NewRoleRepository(db *gorm.DB) repository.RoleRepository {\n"
            );

            let again = driver.run(Operation::FixEncoding, &units(&config, &["role"]));
            assert_eq!(again.targets[0].status, UnitStatus::Skip);
            assert!(again.targets[0].written);
            assert!(!again.targets[0].line_endings_normalized);
            assert!(!again.targets[0].message.contains("line endings"));
        }

        #[test]
        fn all_reaches_final_shape_in_one_pass() {
            let (temp, path) = role_workspace();
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();
            let specs = units(&config, &["role"]);

            let summary = driver.run(Operation::All, &specs);
            assert_eq!(summary.targets[0].status, UnitStatus::Ok);
            let content = fs::read_to_string(&path).unwrap();
            assert!(content.contains("type gormRoleRepository struct"));
            assert!(content
                .contains("func NewRoleRepository(db *gorm.DB) repository.RoleRepository {"));
            assert!(content.contains(
                "\t\"gamelink/internal/model\"\n\t\"gamelink/internal/repository\"\n)"
            ));
            assert!(!content.contains("(nil)"));

            let again = driver.run(Operation::All, &specs);
            assert_eq!(again.targets[0].status, UnitStatus::Skip);
            assert_eq!(fs::read_to_string(&path).unwrap(), content);
        }
    }

    mod batch_behaviour {
        use super::*;

        #[test]
        fn missing_unit_does_not_abort_batch() {
            let (temp, _) = role_workspace();
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();

            let summary = driver.run(Operation::FixNames, &units(&config, &["player", "role"]));
            assert_eq!(summary.total, 2);
            assert_eq!(summary.successes, 1);
            assert_eq!(summary.targets[0].status, UnitStatus::Error);
            assert_eq!(
                summary.targets[0].error.as_ref().unwrap().kind,
                crate::error::ErrorKind::NotFound
            );
            assert_eq!(summary.targets[1].status, UnitStatus::Ok);
        }

        #[cfg(unix)]
        #[test]
        fn write_failure_fails_unit_and_batch_continues() {
            use std::os::unix::fs::PermissionsExt;

            let (temp, role_path) = role_workspace();
            let stats_path = write(
                temp.path(),
                "internal/repository/stats/stats_gorm_repository.go",
                b"type StatsRepository struct{}\n",
            );
            let role_dir = role_path.parent().unwrap().to_path_buf();
            fs::set_permissions(&role_dir, fs::Permissions::from_mode(0o555)).unwrap();
            // Privileged users ignore directory modes; nothing to observe then.
            if fs::write(role_dir.join(".writable"), b"").is_ok() {
                fs::set_permissions(&role_dir, fs::Permissions::from_mode(0o755)).unwrap();
                return;
            }

            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();
            let summary = driver.run(Operation::FixNames, &units(&config, &["role", "stats"]));
            fs::set_permissions(&role_dir, fs::Permissions::from_mode(0o755)).unwrap();

            assert_eq!(summary.total, 2);
            assert_eq!(summary.successes, 1);
            let role = summary.targets.iter().find(|t| t.target == "role").unwrap();
            assert_eq!(role.status, UnitStatus::Error);
            assert_eq!(
                role.error.as_ref().unwrap().kind,
                crate::error::ErrorKind::WriteFailure
            );
            assert!(!role.written);
            assert_eq!(fs::read_to_string(&role_path).unwrap(), ROLE_SOURCE);

            let stats = summary.targets.iter().find(|t| t.target == "stats").unwrap();
            assert_eq!(stats.status, UnitStatus::Ok);
            assert!(stats.written);
            assert_eq!(
                fs::read_to_string(&stats_path).unwrap(),
                "type gormStatsRepository struct{}\n"
            );
        }

        #[test]
        fn fallback_template_resolves_operation_log() {
            let temp = TempDir::new().unwrap();
            write(
                temp.path(),
                "internal/repository/operation_log/repository.go",
                b"type OperationLogRepository struct{}\n",
            );
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();

            let summary = driver.run(Operation::FixNames, &units(&config, &["operation_log"]));
            let report = &summary.targets[0];
            assert_eq!(report.status, UnitStatus::Ok);
            assert_eq!(
                report.path.as_deref(),
                Some("internal/repository/operation_log/repository.go")
            );
        }

        #[test]
        fn non_utf8_without_normalizer_is_decode_failure() {
            let temp = TempDir::new().unwrap();
            write(
                temp.path(),
                "internal/repository/role/role_gorm_repository.go",
                b"\xd6\xd0",
            );
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();

            let summary = driver.run(Operation::FixNames, &units(&config, &["role"]));
            assert_eq!(
                summary.targets[0].error.as_ref().unwrap().kind,
                crate::error::ErrorKind::DecodeFailure
            );
        }

        #[test]
        fn dry_run_produces_diff_and_leaves_file() {
            let (temp, path) = role_workspace();
            let config = FixConfig::default();
            let mut options = BatchOptions::new(temp.path());
            options.dry_run = true;
            let driver = BatchDriver::new(&config, options).unwrap();

            let summary = driver.run(Operation::FixNames, &units(&config, &["role"]));
            let report = &summary.targets[0];
            assert!(!report.written);
            assert!(report
                .diff
                .as_ref()
                .unwrap()
                .contains("+type gormRoleRepository struct {"));
            assert_eq!(fs::read_to_string(&path).unwrap(), ROLE_SOURCE);
        }

        #[test]
        fn status_merge_prefers_worst() {
            assert_eq!(UnitStatus::Skip.merge(UnitStatus::Ok), UnitStatus::Ok);
            assert_eq!(UnitStatus::Ok.merge(UnitStatus::Warn), UnitStatus::Warn);
            assert_eq!(UnitStatus::Warn.merge(UnitStatus::Skip), UnitStatus::Warn);
        }
    }

    mod fixture_batch {
        use super::*;

        #[test]
        fn fixtures_are_rewritten_and_tallied() {
            let temp = TempDir::new().unwrap();
            let order = write(
                temp.path(),
                "internal/order/order_test.go",
                b"package order\n\nimport \"testing\"\n\nvar o = Order{PlayerID: 3}\n",
            );
            write(
                temp.path(),
                "internal/user/user_test.go",
                b"package user\n",
            );
            let config = FixConfig::default();
            let driver = BatchDriver::new(&config, BatchOptions::new(temp.path())).unwrap();

            let summary = driver.run_fixtures().unwrap();
            assert_eq!(summary.total, 2);
            assert_eq!(summary.successes, 2);
            assert_eq!(summary.target_kind, TargetKind::File);
            assert_eq!(summary.targets[0].target, "internal/order/order_test.go");
            assert_eq!(summary.targets[0].status, UnitStatus::Ok);
            assert_eq!(summary.targets[1].status, UnitStatus::Skip);
            assert_eq!(summary.rewrites, 1);

            let content = fs::read_to_string(order).unwrap();
            assert!(content.contains("PlayerID: ptrUint64(3)"));
            assert!(content.contains("func ptrUint64(v uint64) *uint64 { return &v }"));
        }
    }
}
