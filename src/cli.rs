//! CLI front door.
//!
//! Turns parsed command-line intent into a configured batch run:
//! configuration is loaded (explicit `--config`, then `<base>/repofix.toml`,
//! then built-in defaults), the unit list is filtered, and the requested
//! task runs to completion.
//!
//! ## Error Handling
//!
//! Only problems that prevent the batch from starting are returned as
//! `Err`: unreadable or invalid configuration, unknown unit names, a missing
//! base directory. Per-unit failures live inside the returned
//! [`BatchSummary`].

use std::path::PathBuf;

use repofix_core::batch::{BatchDriver, BatchOptions, BatchSummary, Operation};
use repofix_core::config::FixConfig;
use repofix_core::error::FixError;

/// What to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// A unit-level operation over the configured units.
    Units(Operation),
    /// The fixture literal rewriter over the fixture tree.
    Fixtures,
}

/// Everything a run needs from the command line.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub base: PathBuf,
    pub config: Option<PathBuf>,
    pub task: Task,
    /// Restrict the batch to these units (empty means all).
    pub units: Vec<String>,
    pub dry_run: bool,
    /// Run the encoding normalizer before `fix-names`.
    pub normalize: bool,
}

impl RunRequest {
    pub fn new(base: impl Into<PathBuf>, task: Task) -> Self {
        RunRequest {
            base: base.into(),
            config: None,
            task,
            units: Vec::new(),
            dry_run: false,
            normalize: false,
        }
    }
}

/// Load configuration and run the requested task.
pub fn run(request: &RunRequest) -> Result<BatchSummary, FixError> {
    if !request.base.is_dir() {
        return Err(FixError::invalid_args(format!(
            "base directory {} does not exist",
            request.base.display()
        )));
    }
    let config = FixConfig::load(&request.base, request.config.as_deref())?;

    let options = BatchOptions {
        base: request.base.clone(),
        dry_run: request.dry_run,
        normalize: request.normalize,
    };
    let driver = BatchDriver::new(&config, options)?;

    match request.task {
        Task::Units(op) => {
            let units = config.unit_specs(&request.units)?;
            Ok(driver.run(op, &units))
        }
        Task::Fixtures => {
            if !request.units.is_empty() {
                return Err(FixError::invalid_args(
                    "--unit does not apply to fix-fixtures",
                ));
            }
            driver.run_fixtures()
        }
    }
}
