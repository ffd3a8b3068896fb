//! Unit resolution: from a logical unit name to the file that implements it.
//!
//! Each unit carries an ordered list of path templates. Templates are
//! expanded against an explicit base directory and tried in order; the first
//! one naming an existing file wins. Generated files sometimes deviate from
//! the primary naming convention, which is what the later templates are for.

use std::path::{Path, PathBuf};

use crate::config::UNIT_PLACEHOLDER;
use crate::error::{FixError, FixResult};

/// A unit name plus its candidate-path templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    name: String,
    templates: Vec<String>,
}

impl UnitSpec {
    pub fn new(name: impl Into<String>, templates: Vec<String>) -> Self {
        UnitSpec {
            name: name.into(),
            templates,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Expand every template for this unit, relative to `base`.
    pub fn candidates(&self, base: &Path) -> Vec<PathBuf> {
        self.templates
            .iter()
            .map(|template| base.join(template.replace(UNIT_PLACEHOLDER, &self.name)))
            .collect()
    }

    /// Return the first candidate that exists as a file.
    pub fn resolve(&self, base: &Path) -> FixResult<PathBuf> {
        let candidates = self.candidates(base);
        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.is_file() {
                if index > 0 {
                    tracing::debug!(
                        "unit {} resolved via fallback template #{}: {}",
                        self.name,
                        index,
                        candidate.display()
                    );
                }
                return Ok(candidate.clone());
            }
        }
        Err(FixError::NotFound {
            unit: self.name.clone(),
            tried: candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn spec(name: &str) -> UnitSpec {
        UnitSpec::new(
            name,
            vec![
                "internal/repository/{unit}/{unit}_gorm_repository.go".to_string(),
                "internal/repository/{unit}/repository.go".to_string(),
            ],
        )
    }

    fn touch(base: &Path, rel: &str) {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "package x\n").unwrap();
    }

    #[test]
    fn primary_template_wins() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "internal/repository/role/role_gorm_repository.go");
        touch(temp.path(), "internal/repository/role/repository.go");

        let path = spec("role").resolve(temp.path()).unwrap();
        assert!(path.ends_with("role/role_gorm_repository.go"));
    }

    #[test]
    fn fallback_template_used_when_primary_absent() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "internal/repository/operation_log/repository.go");

        let path = spec("operation_log").resolve(temp.path()).unwrap();
        assert!(path.ends_with("operation_log/repository.go"));
    }

    #[test]
    fn not_found_reports_all_candidates() {
        let temp = TempDir::new().unwrap();
        let err = spec("ghost").resolve(temp.path()).unwrap_err();
        match err {
            FixError::NotFound { unit, tried } => {
                assert_eq!(unit, "ghost");
                assert_eq!(tried.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn directory_is_not_a_candidate() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(
            temp.path()
                .join("internal/repository/role/role_gorm_repository.go"),
        )
        .unwrap();
        assert!(spec("role").resolve(temp.path()).is_err());
    }

    #[test]
    fn candidates_substitute_every_placeholder() {
        let candidates = spec("payment").candidates(Path::new("/base"));
        assert_eq!(
            candidates[0],
            PathBuf::from("/base/internal/repository/payment/payment_gorm_repository.go")
        );
    }
}
