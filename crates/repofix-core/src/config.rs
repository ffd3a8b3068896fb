//! Configuration: unit list, path templates, naming, import and encoding
//! settings.
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! file (or no file at all) yields the built-in configuration for the
//! gamelink backend layout.
//!
//! ## Precedence
//!
//! 1. An explicit `--config <path>`
//! 2. `<base>/repofix.toml` if it exists
//! 3. Built-in defaults
//!
//! ## Example
//!
//! ```toml
//! implementation_prefix = "gorm"
//! templates = ["internal/repository/{unit}/{unit}_gorm_repository.go"]
//!
//! [[units]]
//! name = "operation_log"
//! templates = ["internal/repository/{unit}/repository.go"]
//!
//! [import]
//! path = "gamelink/internal/repository"
//! anchor = "gamelink/internal/model"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encoding::SourceEncoding;
use crate::error::{FixError, FixResult};
use crate::imports::ImportSpec;
use crate::unit::UnitSpec;

/// File name looked up in the base directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "repofix.toml";

/// Placeholder substituted with the unit name in path templates.
pub const UNIT_PLACEHOLDER: &str = "{unit}";

/// Units processed by default, in order.
pub const DEFAULT_UNITS: &[&str] = &[
    "user",
    "player",
    "player_tag",
    "payment",
    "permission",
    "role",
    "stats",
    "operation_log",
    "review",
];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixConfig {
    /// Suffix appended to the capitalized unit name.
    pub interface_suffix: String,
    /// Lowercase prefix prepended to the interface identifier.
    pub implementation_prefix: String,
    /// Package namespace holding the contract types.
    pub contract_package: String,
    /// Candidate-path templates used for units without their own list.
    pub templates: Vec<String>,
    /// Ordered unit list.
    pub units: Vec<UnitEntry>,
    /// Import required by every unit.
    pub import: ImportSpec,
    /// Encoding labels, highest priority first.
    pub encodings: Vec<String>,
    /// Fixture rewriter settings.
    pub fixtures: FixtureConfig,
}

/// One entry of the unit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitEntry {
    pub name: String,
    /// Overrides the default templates for this unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<String>>,
}

/// Where the fixture rewriter looks and which helper it injects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixtureConfig {
    /// Directory (relative to base) scanned for fixtures.
    pub root: String,
    /// Glob matched against paths relative to `root`.
    pub pattern: String,
    /// Name of the pointer helper function.
    pub helper_name: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        FixtureConfig {
            root: "internal".to_string(),
            pattern: "**/*_test.go".to_string(),
            helper_name: "ptrUint64".to_string(),
        }
    }
}

impl Default for FixConfig {
    fn default() -> Self {
        FixConfig {
            interface_suffix: "Repository".to_string(),
            implementation_prefix: "gorm".to_string(),
            contract_package: "repository".to_string(),
            templates: vec![
                "internal/repository/{unit}/{unit}_gorm_repository.go".to_string(),
                "internal/repository/{unit}/repository.go".to_string(),
            ],
            units: DEFAULT_UNITS
                .iter()
                .map(|name| UnitEntry {
                    name: (*name).to_string(),
                    templates: None,
                })
                .collect(),
            import: ImportSpec::default(),
            encodings: vec![
                "utf-8".to_string(),
                "gb2312".to_string(),
                "gbk".to_string(),
                "latin-1".to_string(),
            ],
            fixtures: FixtureConfig::default(),
        }
    }
}

impl FixConfig {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> FixResult<Self> {
        let config: FixConfig =
            toml::from_str(text).map_err(|e| FixError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration following the precedence rules.
    pub fn load(base: &Path, explicit: Option<&Path>) -> FixResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = base.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    tracing::debug!(
                        "no {} in {}, using defaults",
                        CONFIG_FILE_NAME,
                        base.display()
                    );
                    return Ok(FixConfig::default());
                }
                candidate
            }
        };
        tracing::debug!("loading configuration from {}", path.display());
        let text = fs::read_to_string(&path).map_err(|e| {
            FixError::invalid_config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> FixResult<()> {
        if self.interface_suffix.is_empty() {
            return Err(FixError::invalid_config("interface_suffix must not be empty"));
        }
        if self.units.is_empty() {
            return Err(FixError::invalid_config("unit list is empty"));
        }
        for unit in &self.units {
            let templates = unit.templates.as_ref().unwrap_or(&self.templates);
            if templates.is_empty() {
                return Err(FixError::invalid_config(format!(
                    "unit '{}' has no path templates",
                    unit.name
                )));
            }
        }
        if self.encodings.is_empty() {
            return Err(FixError::invalid_config("encoding list is empty"));
        }
        self.encodings()?;
        Ok(())
    }

    /// Resolve the configured encoding labels.
    pub fn encodings(&self) -> FixResult<Vec<SourceEncoding>> {
        self.encodings
            .iter()
            .map(|label| {
                SourceEncoding::from_label(label).ok_or_else(|| {
                    FixError::invalid_config(format!("unknown encoding '{}'", label))
                })
            })
            .collect()
    }

    /// Expand the unit list into resolver specs.
    ///
    /// `only` restricts the list to the named units, keeping configured order.
    /// Naming a unit that is not configured is an argument error.
    pub fn unit_specs(&self, only: &[String]) -> FixResult<Vec<UnitSpec>> {
        if let Some(unknown) = only
            .iter()
            .find(|name| !self.units.iter().any(|u| &u.name == *name))
        {
            return Err(FixError::invalid_args(format!(
                "unit '{}' is not configured",
                unknown
            )));
        }
        Ok(self
            .units
            .iter()
            .filter(|u| only.is_empty() || only.contains(&u.name))
            .map(|u| {
                UnitSpec::new(
                    u.name.clone(),
                    u.templates.clone().unwrap_or_else(|| self.templates.clone()),
                )
            })
            .collect())
    }
}
