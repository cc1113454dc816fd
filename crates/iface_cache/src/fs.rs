//! Filesystem and dependency-tracking collaborators.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use indexmap::IndexSet;

/// The filesystem primitives the cache needs.
///
/// Implementations must be shareable with the isolated rebuild thread.
pub trait FileSystem: Send + Sync {
    /// Returns `true` if `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces the file at `path` with `data` so that readers observe either
    /// the old content or the new content, never a partial write.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Creates `path` and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by the real disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Stage next to the destination so the rename never crosses devices.
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(data)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// The host build system's dependency sink.
///
/// Called for every file the cache reads or validates, whatever the outcome
/// of the request, so the host learns the complete candidate dependency set.
pub trait DependencyTracker: Send + Sync {
    /// Records that the current compilation depends on `path`.
    fn add_dependency(&self, path: &Path, is_system: bool);
}

/// A [`DependencyTracker`] that remembers every distinct path in the order
/// it was first reported.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    paths: Mutex<IndexSet<PathBuf>>,
}

impl RecordingTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded paths in first-seen order.
    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl DependencyTracker for RecordingTracker {
    fn add_dependency(&self, path: &Path, _is_system: bool) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo-1.artifact");
        let fs = RealFileSystem;

        fs.write_atomic(&path, b"first").unwrap();
        fs.write_atomic(&path, b"second").unwrap();
        assert_eq!(fs.read(&path).unwrap(), b"second");

        // Only the destination is left behind.
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn write_atomic_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.artifact");
        assert!(RealFileSystem.write_atomic(&path, b"x").is_err());
        assert!(!RealFileSystem.exists(&path));
    }

    #[test]
    fn exists_is_false_for_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!RealFileSystem.exists(dir.path()));
    }

    #[test]
    fn tracker_deduplicates_in_order() {
        let tracker = RecordingTracker::new();
        tracker.add_dependency(Path::new("b"), false);
        tracker.add_dependency(Path::new("a"), false);
        tracker.add_dependency(Path::new("b"), false);
        assert_eq!(
            tracker.dependencies(),
            vec![PathBuf::from("b"), PathBuf::from("a")]
        );
    }
}
