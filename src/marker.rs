//! Recovery marker for interrupted finish operations.
//!
//! When a finish-merge stops on conflicts, the merge target's name is written
//! to `<git-dir>/.gitflow-merge-marker`. The next finish reads it to decide
//! whether it is resuming, and clears it once the branch has been cleaned up.

use crate::context::Repository;
use crate::error::{GflowError, Result};
use crate::fs::atomic_write_file;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RecoveryMarker {
    path: PathBuf,
}

impl RecoveryMarker {
    pub fn new(repo: &Repository) -> Self {
        Self::at(repo.marker_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `branch` as the target of an interrupted merge.
    pub fn write(&self, branch: &str) -> Result<()> {
        atomic_write_file(&self.path, &format!("{}\n", branch))?;
        tracing::info!(branch, path = %self.path.display(), "recovery marker written");
        Ok(())
    }

    /// The recorded branch, or `None` when no finish is pending.
    pub fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let branch = content.trim();
                Ok((!branch.is_empty()).then(|| branch.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GflowError::UserError(format!(
                "failed to read recovery marker '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "recovery marker cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GflowError::UserError(format!(
                "failed to remove recovery marker '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absent_marker_reads_none() {
        let temp_dir = TempDir::new().unwrap();
        let marker = RecoveryMarker::at(temp_dir.path().join(".gitflow-merge-marker"));
        assert_eq!(marker.read().unwrap(), None);
    }

    #[test]
    fn test_write_read_clear() {
        let temp_dir = TempDir::new().unwrap();
        let marker = RecoveryMarker::at(temp_dir.path().join(".gitflow-merge-marker"));

        marker.write("master").unwrap();
        assert_eq!(marker.read().unwrap(), Some("master".to_string()));
        assert_eq!(
            fs::read_to_string(marker.path()).unwrap().trim(),
            "master",
            "the file holds only the branch name"
        );

        marker.clear().unwrap();
        assert_eq!(marker.read().unwrap(), None);
        assert!(!marker.path().exists());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let marker = RecoveryMarker::at(temp_dir.path().join(".gitflow-merge-marker"));
        marker.clear().unwrap();
        marker.clear().unwrap();
    }

    #[test]
    fn test_blank_marker_reads_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".gitflow-merge-marker");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(RecoveryMarker::at(path).read().unwrap(), None);
    }

    #[test]
    fn test_write_overwrites_previous_target() {
        let temp_dir = TempDir::new().unwrap();
        let marker = RecoveryMarker::at(temp_dir.path().join(".gitflow-merge-marker"));
        marker.write("master").unwrap();
        marker.write("develop").unwrap();
        assert_eq!(marker.read().unwrap(), Some("develop".to_string()));
    }
}
