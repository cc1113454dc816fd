//! Cache keys naming artifact slots in the shared cache directory.
//!
//! The key separates requests that must never share an artifact (different
//! toolchain builds, different inputs with the same module name, different
//! targets). It deliberately ignores file content: a changed input keeps its
//! slot and is caught by the ledger check instead, so the cache overwrites
//! stale entries rather than filling up with dead ones.

use std::fmt;
use std::path::{Path, PathBuf};

use iface_config::BuildOptions;
use xxhash_rust::xxh3::Xxh3;

use crate::interface::ARTIFACT_EXTENSION;

/// The subset of build configuration that changes the shape of generated
/// code and therefore belongs in the key.
///
/// Search paths are not part of it, so reordering them keeps the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyConfig {
    /// Target triple.
    pub target_triple: String,
    /// SDK root.
    pub sdk_path: Option<PathBuf>,
    /// Runtime resource directory.
    pub resource_dir: Option<PathBuf>,
}

impl From<&BuildOptions> for KeyConfig {
    fn from(opts: &BuildOptions) -> Self {
        Self {
            target_triple: opts.target_triple.clone(),
            sdk_path: opts.sdk_path.clone(),
            resource_dir: opts.resource_dir.clone(),
        }
    }
}

/// A 64-bit cache key, rendered in base 36.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Computes the key for building `input_path` with `toolchain_version`
    /// under `config`. Pure: performs no I/O.
    pub fn compute(toolchain_version: &str, input_path: &Path, config: &KeyConfig) -> Self {
        let mut hasher = Xxh3::new();
        write_field(&mut hasher, toolchain_version.as_bytes());
        write_field(&mut hasher, input_path.as_os_str().as_encoded_bytes());
        write_field(&mut hasher, config.target_triple.as_bytes());
        write_optional_path(&mut hasher, config.sdk_path.as_deref());
        write_optional_path(&mut hasher, config.resource_dir.as_deref());
        Self(hasher.digest())
    }

    /// Returns the raw key value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

// Length-prefix every field so ("ab", "c") and ("a", "bc") hash differently.
fn write_field(hasher: &mut Xxh3, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn write_optional_path(hasher: &mut Xxh3, path: Option<&Path>) {
    match path {
        Some(p) => {
            hasher.update(&[1]);
            write_field(hasher, p.as_os_str().as_encoded_bytes());
        }
        None => hasher.update(&[0]),
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut buf = [0u8; 13]; // 36^13 > 2^64
        let mut pos = buf.len();
        let mut n = self.0;
        loop {
            pos -= 1;
            buf[pos] = DIGITS[(n % 36) as usize];
            n /= 36;
            if n == 0 {
                break;
            }
        }
        // Every byte written is ASCII.
        f.write_str(std::str::from_utf8(&buf[pos..]).map_err(|_| fmt::Error)?)
    }
}

/// Returns `<cache_dir>/<module_name>-<key>.artifact`.
pub fn cached_output_path(cache_dir: &Path, module_name: &str, key: CacheKey) -> PathBuf {
    cache_dir.join(format!("{module_name}-{key}.{ARTIFACT_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(triple: &str) -> KeyConfig {
        KeyConfig {
            target_triple: triple.to_string(),
            ..KeyConfig::default()
        }
    }

    #[test]
    fn stable_across_calls() {
        let c = config("x86_64-unknown-linux");
        let a = CacheKey::compute("5.1", Path::new("/lib/Foo.interfacetext"), &c);
        let b = CacheKey::compute("5.1", Path::new("/lib/Foo.interfacetext"), &c);
        assert_eq!(a, b);
    }

    #[test]
    fn each_component_changes_the_key() {
        let base = CacheKey::compute("5.1", Path::new("Foo.interfacetext"), &config("x86_64"));
        assert_ne!(
            base,
            CacheKey::compute("5.2", Path::new("Foo.interfacetext"), &config("x86_64"))
        );
        assert_ne!(
            base,
            CacheKey::compute("5.1", Path::new("other/Foo.interfacetext"), &config("x86_64"))
        );
        assert_ne!(
            base,
            CacheKey::compute("5.1", Path::new("Foo.interfacetext"), &config("arm64"))
        );
        let with_sdk = KeyConfig {
            sdk_path: Some(PathBuf::from("/sdk")),
            ..config("x86_64")
        };
        assert_ne!(
            base,
            CacheKey::compute("5.1", Path::new("Foo.interfacetext"), &with_sdk)
        );
    }

    #[test]
    fn field_boundaries_matter() {
        let a = CacheKey::compute("ab", Path::new("c"), &KeyConfig::default());
        let b = CacheKey::compute("a", Path::new("bc"), &KeyConfig::default());
        assert_ne!(a, b);
    }

    #[test]
    fn base36_rendering() {
        assert_eq!(CacheKey(0).to_string(), "0");
        assert_eq!(CacheKey(35).to_string(), "z");
        assert_eq!(CacheKey(36).to_string(), "10");
        assert_eq!(CacheKey(u64::MAX).to_string(), "3w5e11264sgsf");
    }

    #[test]
    fn output_path_shape() {
        let path = cached_output_path(Path::new("cache"), "Foo", CacheKey(36));
        assert_eq!(path, PathBuf::from("cache/Foo-10.artifact"));
    }

    #[test]
    fn key_config_ignores_search_paths() {
        let mut opts = BuildOptions {
            target_triple: "x86_64".to_string(),
            import_search_paths: vec![PathBuf::from("a"), PathBuf::from("b")],
            ..BuildOptions::default()
        };
        let before = KeyConfig::from(&opts);
        opts.import_search_paths.reverse();
        assert_eq!(before, KeyConfig::from(&opts));
    }

    proptest! {
        #[test]
        fn rendering_is_filesystem_safe(n in any::<u64>()) {
            let s = CacheKey(n).to_string();
            prop_assert!(!s.is_empty() && s.len() <= 13);
            prop_assert!(s.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
            prop_assert_eq!(u64::from_str_radix(&s, 36).unwrap(), n);
        }

        #[test]
        fn search_path_order_never_changes_key(
            mut paths in proptest::collection::vec("[a-z]{1,6}", 0..6),
        ) {
            let mut opts = BuildOptions {
                target_triple: "arm64".to_string(),
                import_search_paths: paths.iter().map(PathBuf::from).collect(),
                ..BuildOptions::default()
            };
            let input = Path::new("Foo.interfacetext");
            let before = CacheKey::compute("5.1", input, &KeyConfig::from(&opts));
            paths.reverse();
            opts.import_search_paths = paths.iter().map(PathBuf::from).collect();
            let after = CacheKey::compute("5.1", input, &KeyConfig::from(&opts));
            prop_assert_eq!(before, after);
        }
    }
}
