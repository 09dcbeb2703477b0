//! Atomic file output
//!
//! Bytes go to a temporary file next to the target, which is then renamed
//! over it. A failed run leaves nothing at the target path, including when
//! the report is written together with its metrics dump.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    write_all_atomic(&[(path, bytes)])
}

/// Write several files as one unit.
///
/// Every file is staged before any is moved into place. Files are persisted in
/// order, so the last entry only appears once all the others have. If a later
/// move fails, the files already persisted are removed again.
pub fn write_all_atomic(outputs: &[(&Path, &[u8])]) -> Result<()> {
    let staged = outputs
        .iter()
        .map(|(path, bytes)| stage(path, bytes))
        .collect::<Result<Vec<_>>>()?;

    let mut persisted: Vec<&Path> = Vec::with_capacity(staged.len());
    for (file, (path, bytes)) in staged.into_iter().zip(outputs) {
        if let Err(err) = file.persist(path) {
            for done in persisted {
                if let Err(cleanup) = std::fs::remove_file(done) {
                    tracing::warn!(path = %done.display(), error = %cleanup, "cannot remove partial output");
                }
            }
            return Err(err).with_context(|| format!("Cannot move output into place at {}", path.display()));
        }
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "output written");
        persisted.push(path);
    }
    Ok(())
}

/// Temporary file next to `path` holding `bytes`, dropped (and deleted) on error.
fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Cannot create a temporary file in {}", dir.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    file.as_file()
        .sync_all()
        .with_context(|| format!("Cannot flush {}", path.display()))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        // Only the target remains
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn group_with_unwritable_member_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("report.xlsx");
        let metrics = dir.path().join("missing").join("metrics.json");

        let result = write_all_atomic(&[(metrics.as_path(), b"{}"), (report.as_path(), b"data")]);
        assert!(result.is_err());
        assert!(!report.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn group_writes_every_member() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("report.pdf");
        let metrics = dir.path().join("metrics.json");

        write_all_atomic(&[(metrics.as_path(), b"{}"), (report.as_path(), b"%PDF")]).unwrap();
        assert_eq!(std::fs::read(&metrics).unwrap(), b"{}");
        assert_eq!(std::fs::read(&report).unwrap(), b"%PDF");
    }

    #[test]
    fn missing_directory_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.xlsx");

        assert!(write_atomic(&path, b"data").is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
