//! Removal of the downloaded archive once extraction is over

use std::path::{Path, PathBuf};

/// Deletes every registered path on drop
///
/// Covers the original download and the `.zip` copy it may be renamed to,
/// on success, error and panic alike.
#[derive(Debug, Default)]
pub(crate) struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            paths: vec![path.to_path_buf()],
        }
    }

    pub(crate) fn also(&mut self, path: &Path) {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_path_buf());
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::trace!(path = %path.display(), "removed archive"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "failed to remove archive");
                }
            }
        }
    }
}
