//! Up-to-date checks for cached artifacts.

use std::path::Path;

use iface_common::Fingerprint;
use tracing::debug;

use crate::artifact::{validate_artifact, ValidationStatus};
use crate::fs::{DependencyTracker, FileSystem};

/// Returns `true` if the artifact at `artifact_path` may be used as-is for
/// module `module_name`.
///
/// Fails closed: an unreadable or corrupt artifact, an unreadable dependency,
/// or a dependency whose fingerprint changed all make the artifact stale.
/// Dependencies are checked in ledger order and the first stale one ends the
/// check. Every dependency that gets checked is reported to `tracker` first,
/// including the stale one. Performs no writes.
pub fn is_up_to_date(
    fs: &dyn FileSystem,
    module_name: &str,
    artifact_path: &Path,
    tracker: Option<&dyn DependencyTracker>,
) -> bool {
    let raw = match fs.read(artifact_path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(path = %artifact_path.display(), %err, "no cached artifact");
            return false;
        }
    };

    let info = validate_artifact(&raw);
    if info.status != ValidationStatus::Valid {
        debug!(path = %artifact_path.display(), status = %info.status, "cached artifact is corrupt");
        return false;
    }

    // The key includes the input path, which names the module, so a
    // different name here means two modules hashed to the same slot.
    debug_assert_eq!(
        info.module_name, module_name,
        "cache key collision at {}",
        artifact_path.display()
    );
    if info.module_name != module_name {
        return false;
    }

    for (path, recorded) in info.dependencies.iter() {
        if let Some(tracker) = tracker {
            tracker.add_dependency(path, false);
        }
        let live = match fs.read(path) {
            Ok(bytes) => Fingerprint::of(&bytes),
            Err(err) => {
                debug!(dependency = %path.display(), %err, "dependency is unreadable");
                return false;
            }
        };
        if live != recorded {
            debug!(
                dependency = %path.display(),
                %recorded,
                %live,
                "dependency changed"
            );
            return false;
        }
    }

    debug!(path = %artifact_path.display(), "cached artifact is up to date");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::encode_artifact;
    use crate::fs::{RealFileSystem, RecordingTracker};
    use crate::ledger::DependencyLedger;
    use std::path::PathBuf;

    struct Fixture {
        _dir: tempfile::TempDir,
        artifact: PathBuf,
        deps: Vec<PathBuf>,
    }

    fn fixture(module_name: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = DependencyLedger::new();
        let mut deps = Vec::new();
        for (name, content) in [("a.interfacetext", "a"), ("b.interfacetext", "b"), ("c.interfacetext", "c")] {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            ledger.insert(path.clone(), Fingerprint::of(content.as_bytes()));
            deps.push(path);
        }
        let artifact = dir.path().join("Foo-1.artifact");
        let raw = encode_artifact(module_name, "5.1", &ledger, b"payload").unwrap();
        std::fs::write(&artifact, raw).unwrap();
        Fixture {
            _dir: dir,
            artifact,
            deps,
        }
    }

    #[test]
    fn unchanged_dependencies_are_up_to_date() {
        let fx = fixture("Foo");
        let tracker = RecordingTracker::new();
        assert!(is_up_to_date(&RealFileSystem, "Foo", &fx.artifact, Some(&tracker)));
        assert_eq!(tracker.dependencies(), fx.deps);
    }

    #[test]
    fn missing_artifact_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo-1.artifact");
        assert!(!is_up_to_date(&RealFileSystem, "Foo", &path, None));
    }

    #[test]
    fn corrupt_artifact_is_stale() {
        let fx = fixture("Foo");
        std::fs::write(&fx.artifact, b"not an artifact").unwrap();
        assert!(!is_up_to_date(&RealFileSystem, "Foo", &fx.artifact, None));
    }

    #[test]
    fn changed_dependency_short_circuits() {
        let fx = fixture("Foo");
        std::fs::write(&fx.deps[1], "B changed").unwrap();
        let tracker = RecordingTracker::new();
        assert!(!is_up_to_date(&RealFileSystem, "Foo", &fx.artifact, Some(&tracker)));
        // The stale entry is reported, the one after it is never reached.
        assert_eq!(tracker.dependencies(), fx.deps[..2].to_vec());
    }

    #[test]
    fn same_size_edit_is_detected() {
        let fx = fixture("Foo");
        std::fs::write(&fx.deps[0], "z").unwrap();
        assert!(!is_up_to_date(&RealFileSystem, "Foo", &fx.artifact, None));
    }

    #[test]
    fn deleted_dependency_is_stale() {
        let fx = fixture("Foo");
        std::fs::remove_file(&fx.deps[2]).unwrap();
        let tracker = RecordingTracker::new();
        assert!(!is_up_to_date(&RealFileSystem, "Foo", &fx.artifact, Some(&tracker)));
        assert_eq!(tracker.dependencies().len(), 3);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn name_collision_is_stale_in_release() {
        let fx = fixture("Bar");
        assert!(!is_up_to_date(&RealFileSystem, "Foo", &fx.artifact, None));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "cache key collision")]
    fn name_collision_asserts_in_debug() {
        let fx = fixture("Bar");
        is_up_to_date(&RealFileSystem, "Foo", &fx.artifact, None);
    }
}
