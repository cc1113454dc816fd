//! Dependency ledger collection after a rebuild.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use iface_common::Fingerprint;
use tracing::debug;

use crate::artifact::{validate_artifact, ValidationStatus};
use crate::error::RebuildError;
use crate::fs::{DependencyTracker, FileSystem};
use crate::interface::ARTIFACT_EXTENSION;
use crate::ledger::DependencyLedger;

/// Builds the ledger embedded in a freshly compiled artifact.
///
/// A cached artifact found among the files a rebuild read is recorded like any
/// other file, and its own ledger is spliced in right after it. Each of those
/// ledgers was flattened the same way when it was written, so pulling up one
/// level is enough to make the result complete.
pub struct DependencyCollector<'a> {
    fs: &'a dyn FileSystem,
    cache_dir: Option<&'a Path>,
    tracker: Option<&'a dyn DependencyTracker>,
}

impl<'a> DependencyCollector<'a> {
    /// Creates a collector. Without a `cache_dir` no nested artifact is
    /// recognised and every read file is fingerprinted directly.
    pub fn new(
        fs: &'a dyn FileSystem,
        cache_dir: Option<&'a Path>,
        tracker: Option<&'a dyn DependencyTracker>,
    ) -> Self {
        Self {
            fs,
            cache_dir,
            tracker,
        }
    }

    /// Collects the ledger for a rebuild of `input` that read `read_files`.
    ///
    /// `input` is always the first entry, whether or not the backend reported
    /// it. Paths are deduplicated with the first occurrence kept.
    pub fn collect(
        &self,
        read_files: &[PathBuf],
        input: &Path,
    ) -> Result<DependencyLedger, RebuildError> {
        let mut ledger = DependencyLedger::new();
        let mut seen_artifacts = HashSet::new();

        let candidates = std::iter::once(input).chain(read_files.iter().map(PathBuf::as_path));
        for path in candidates {
            if ledger.contains(path) || seen_artifacts.contains(path) {
                continue;
            }

            if self.is_cached_artifact(path) {
                seen_artifacts.insert(path.to_path_buf());
                self.splice_nested(path, input, &mut ledger)?;
                continue;
            }

            self.track(path);
            let bytes = self
                .fs
                .read(path)
                .map_err(|source| RebuildError::MissingDependency {
                    dependency: path.to_path_buf(),
                    interface: input.to_path_buf(),
                    source,
                })?;
            ledger.insert(path, Fingerprint::of(&bytes));
        }

        debug!(
            input = %input.display(),
            entries = ledger.len(),
            nested = seen_artifacts.len(),
            "collected dependency ledger"
        );
        Ok(ledger)
    }

    fn is_cached_artifact(&self, path: &Path) -> bool {
        let Some(cache_dir) = self.cache_dir else {
            return false;
        };
        path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION) && path.starts_with(cache_dir)
    }

    fn splice_nested(
        &self,
        path: &Path,
        input: &Path,
        ledger: &mut DependencyLedger,
    ) -> Result<(), RebuildError> {
        self.track(path);
        let raw = self
            .fs
            .read(path)
            .map_err(|source| RebuildError::MissingDependency {
                dependency: path.to_path_buf(),
                interface: input.to_path_buf(),
                source,
            })?;
        let info = validate_artifact(&raw);
        if info.status != ValidationStatus::Valid {
            return Err(RebuildError::NestedArtifact {
                path: path.to_path_buf(),
                status: info.status,
            });
        }

        ledger.insert(path, Fingerprint::of(&raw));
        for (dep, fingerprint) in info.dependencies.iter() {
            if ledger.insert(dep, fingerprint) {
                self.track(dep);
            }
        }
        Ok(())
    }

    fn track(&self, path: &Path) {
        if let Some(tracker) = self.tracker {
            tracker.add_dependency(path, false);
        }
    }
}
