//! The dependency ledger embedded in every compiled artifact.

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use iface_common::Fingerprint;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One ledger entry: a file an artifact was built from and its fingerprint
/// at build time. Equality is by path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDependency {
    /// The dependency path as it was read.
    pub path: PathBuf,
    /// Fingerprint of the content that was read.
    pub fingerprint: Fingerprint,
}

impl PartialEq for FileDependency {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileDependency {}

impl Hash for FileDependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// Ordered set of [`FileDependency`] entries, unique by path.
///
/// Insertion order is preserved and the first entry for a path wins, so a
/// ledger can never hold two fingerprints for the same file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<FileDependency>", into = "Vec<FileDependency>")]
pub struct DependencyLedger {
    entries: IndexMap<PathBuf, Fingerprint>,
}

impl DependencyLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `path` unless it is already present. Returns `true` if added.
    pub fn insert(&mut self, path: impl Into<PathBuf>, fingerprint: Fingerprint) -> bool {
        match self.entries.entry(path.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(fingerprint);
                true
            }
        }
    }

    /// Returns `true` if `path` has an entry.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Returns the recorded fingerprint of `path`.
    pub fn get(&self, path: &Path) -> Option<Fingerprint> {
        self.entries.get(path).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, Fingerprint)> + '_ {
        self.entries.iter().map(|(p, fp)| (p.as_path(), *fp))
    }

    /// Returns the entry paths in insertion order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.keys().cloned().collect()
    }
}

impl From<Vec<FileDependency>> for DependencyLedger {
    fn from(deps: Vec<FileDependency>) -> Self {
        let mut ledger = Self::new();
        for dep in deps {
            ledger.insert(dep.path, dep.fingerprint);
        }
        ledger
    }
}

impl From<DependencyLedger> for Vec<FileDependency> {
    fn from(ledger: DependencyLedger) -> Self {
        ledger
            .entries
            .into_iter()
            .map(|(path, fingerprint)| FileDependency { path, fingerprint })
            .collect()
    }
}
