//! File reading and atomic persistence.
//!
//! Every unit's file is read fully, closed, rewritten in memory and then
//! replaced in one step. Writes go through a temp file in the target's own
//! directory and are renamed over the target, so readers see either the old
//! or the new content. The original permissions are carried over.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{FixError, FixResult};

/// Read the whole file.
pub fn read_file(path: &Path) -> FixResult<Vec<u8>> {
    fs::read(path).map_err(|source| FixError::ReadFailure {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace `path` with `content` atomically.
pub fn write_atomic(path: &Path, content: &[u8]) -> FixResult<()> {
    let write_failure = |source| FixError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path).ok().map(|m| m.permissions());

    let mut temp = NamedTempFile::new_in(dir).map_err(write_failure)?;
    temp.write_all(content).map_err(write_failure)?;
    temp.as_file().sync_all().map_err(write_failure)?;
    if let Some(permissions) = permissions {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(write_failure)?;
    }
    temp.persist(path).map_err(|e| write_failure(e.error))?;
    tracing::debug!("wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
