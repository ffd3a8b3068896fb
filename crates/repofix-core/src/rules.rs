//! Anchored, idempotent rewrite rules.
//!
//! A [`RewriteRule`] is a regex anchored to one structural position (a type
//! declaration header, a constructor signature, a return statement, a
//! method receiver) plus a replacement template. Rules are declared once per
//! unit and applied in a fixed order by a [`RuleSet`].
//!
//! Every rule's replacement falls outside its own pattern, so a second pass
//! over rewritten content matches nothing. A rule that matches nothing is
//! not an error; it is reported as `PatternNotMatched`.
//!
//! ## Collision rules
//!
//! For interface `RoleRepository` and implementation `gormRoleRepository`:
//!
//! | Rule | Before | After |
//! |------|--------|-------|
//! | `declaration-rename` | `type RoleRepository struct` | `type gormRoleRepository struct` |
//! | `constructor-return-type` | `func NewRoleRepository(db *DB) *RoleRepository` | `func NewRoleRepository(db *DB) RoleRepository` |
//! | `constructor-return-literal` | `return &RoleRepository{` | `return &gormRoleRepository{` |
//! | `method-receiver` | `func (r *RoleRepository)` | `func (r *gormRoleRepository)` |

use std::borrow::Cow;

use regex::Regex;
use serde::Serialize;

use crate::error::{FixError, FixResult};
use crate::names::IdentifierPair;
use crate::text::byte_offset_to_line;

/// A parameter list body, allowing one level of nested parentheses so
/// function-typed parameters like `opts ...func(*Options)` still match.
const PARAMS: &str = r"(?:[^()]|\([^()]*\))*";

/// Escape `$` so a literal survives regex replacement expansion.
fn literal(text: &str) -> String {
    text.replace('$', "$$")
}

fn compile(name: &str, pattern: &str) -> FixResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| FixError::internal(format!("rule '{}' failed to compile: {}", name, e)))
}

// ============================================================================
// Rule
// ============================================================================

/// One anchored pattern and its replacement template.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: &'static str,
    pattern: Regex,
    replacement: String,
}

/// What one rule did to one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub rule: String,
    pub matches: usize,
    /// 1-indexed lines of each match, in the content the rule ran on.
    pub lines: Vec<u32>,
}

impl RuleOutcome {
    /// `PatternNotMatched` note when the rule matched nothing.
    pub fn not_matched(&self) -> Option<FixError> {
        (self.matches == 0).then(|| FixError::pattern_not_matched(self.rule.clone()))
    }
}

impl RewriteRule {
    /// Build a rule. `replacement` uses regex expansion syntax (`${1}`).
    pub fn new(
        name: &'static str,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> FixResult<Self> {
        Ok(RewriteRule {
            name,
            pattern: compile(name, pattern)?,
            replacement: replacement.into(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the rule to `content`.
    pub fn apply<'a>(&self, content: &'a str) -> (Cow<'a, str>, RuleOutcome) {
        let lines: Vec<u32> = self
            .pattern
            .find_iter(content)
            .map(|m| byte_offset_to_line(content, m.start()))
            .collect();
        let outcome = RuleOutcome {
            rule: self.name.to_string(),
            matches: lines.len(),
            lines,
        };
        if outcome.matches == 0 {
            tracing::debug!("rule {} matched nothing", self.name);
            return (Cow::Borrowed(content), outcome);
        }
        tracing::debug!("rule {} matched {} time(s)", self.name, outcome.matches);
        let rewritten = self.pattern.replace_all(content, self.replacement.as_str());
        (rewritten, outcome)
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// Rules applied in declaration order.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

/// Output of applying a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteReport {
    pub content: String,
    pub outcomes: Vec<RuleOutcome>,
}

impl RewriteReport {
    /// Total matches across all rules.
    pub fn total_matches(&self) -> usize {
        self.outcomes.iter().map(|o| o.matches).sum()
    }

    /// `PatternNotMatched` notes for every rule that matched nothing.
    pub fn notes(&self) -> Vec<FixError> {
        self.outcomes.iter().filter_map(RuleOutcome::not_matched).collect()
    }
}

impl RuleSet {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        RuleSet { rules }
    }

    /// The four rules that move the concrete type off the interface name.
    ///
    /// Order matters: the constructor rules anchor on `New<Interface>`, which
    /// the declaration rename leaves alone, and the receiver rule runs last so
    /// it never sees a half-rewritten constructor.
    pub fn collision_rules(pair: &IdentifierPair) -> FixResult<Self> {
        let iface = regex::escape(&pair.interface);
        let iface_out = literal(&pair.interface);
        let imp = literal(&pair.implementation);

        Ok(RuleSet::new(vec![
            RewriteRule::new(
                "declaration-rename",
                &format!(r"(?m)^type {iface} struct\b"),
                format!("type {imp} struct"),
            )?,
            RewriteRule::new(
                "constructor-return-type",
                &format!(r"func New{iface}\(({PARAMS})\) \*{iface}\b"),
                format!("func New{iface_out}(${{1}}) {iface_out}"),
            )?,
            RewriteRule::new(
                "constructor-return-literal",
                &format!(r"\breturn &{iface}\{{"),
                format!("return &{imp}{{"),
            )?,
            RewriteRule::new(
                "method-receiver",
                &format!(r"\bfunc \((\w+) \*{iface}\)"),
                format!("func (${{1}} *{imp})"),
            )?,
        ]))
    }

    /// Qualify bare constructor return types with the contract package.
    ///
    /// `func NewXRepository(db *gorm.DB) XRepository {` becomes
    /// `func NewXRepository(db *gorm.DB) repository.XRepository {`.
    pub fn contract_qualify(suffix: &str, package: &str) -> FixResult<Self> {
        let suffix = regex::escape(suffix);
        let package = literal(package);
        Ok(RuleSet::new(vec![RewriteRule::new(
            "contract-qualify",
            &format!(r"func (New\w+{suffix}\({PARAMS}\)) (\w+{suffix}) \{{"),
            format!("func ${{1}} {package}.${{2}} {{"),
        )?]))
    }

    /// Apply every rule in order, each to the previous rule's output.
    pub fn apply(&self, content: &str) -> RewriteReport {
        let mut current = content.to_string();
        let mut outcomes = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let (next, outcome) = rule.apply(&current);
            if let Cow::Owned(next) = next {
                current = next;
            }
            outcomes.push(outcome);
        }
        RewriteReport {
            content: current,
            outcomes,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
