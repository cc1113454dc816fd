//! Configuration types deserialized from `iface.toml`.

use crate::options::BuildOptions;
use serde::Deserialize;
use std::path::PathBuf;

/// The top-level host configuration parsed from `iface.toml`.
#[derive(Debug, Deserialize)]
pub struct HostConfig {
    /// The toolchain producing and consuming cached artifacts.
    pub toolchain: ToolchainConfig,
    /// Cache and search locations.
    pub paths: PathsConfig,
    /// Compilation target.
    #[serde(default)]
    pub target: TargetConfig,
    /// Module loader policy.
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Host build settings inherited by rebuilds.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Toolchain identity.
#[derive(Debug, Deserialize)]
pub struct ToolchainConfig {
    /// Full toolchain version string (tag or revision). Part of every cache key.
    pub version: String,
}

/// Filesystem locations used by the host.
#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    /// Shared directory holding one compiled artifact per module and key.
    pub cache_dir: PathBuf,
    /// SDK root, if any.
    #[serde(default)]
    pub sdk: Option<PathBuf>,
    /// Runtime resource directory, if any.
    #[serde(default)]
    pub resource_dir: Option<PathBuf>,
    /// Directories searched for imported modules.
    #[serde(default)]
    pub import_search_paths: Vec<PathBuf>,
    /// Directories searched for framework bundles.
    #[serde(default)]
    pub framework_search_paths: Vec<PathBuf>,
}

/// The compilation target.
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    /// Target triple, e.g. `x86_64-unknown-linux-gnu`.
    #[serde(default = "default_triple")]
    pub triple: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            triple: default_triple(),
        }
    }
}

fn default_triple() -> String {
    format!(
        "{}-unknown-{}",
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

/// Module loader settings.
#[derive(Debug, Default, Deserialize)]
pub struct LoaderConfig {
    /// Which artifact kind the loader chain prefers.
    #[serde(default)]
    pub mode: LoadMode,
}

/// Caller-selected policy for choosing between precompiled artifacts and
/// rebuilding from interface text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadMode {
    /// Use a plausible adjacent compiled artifact as-is; rebuild only when
    /// none is usable.
    #[default]
    PreferSerialized,
    /// Always go through the interface text and the rebuild cache.
    PreferInterface,
    /// Never consult interface text.
    OnlySerialized,
}

/// Host build settings.
#[derive(Debug, Default, Deserialize)]
pub struct BuildConfig {
    /// Whether the host runs in a debugger or interactive session.
    #[serde(default)]
    pub debugger_support: bool,
}

/// Code-generation optimization mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OptLevel {
    /// No optimization (`-Onone`).
    #[default]
    None,
    /// Optimize for runtime speed (`-O`).
    Speed,
    /// Optimize for code size (`-Osize`).
    Size,
}

impl HostConfig {
    /// Resolves the file into the host's active build options.
    ///
    /// The module name is left empty; it belongs to each individual request.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            target_triple: self.target.triple.clone(),
            sdk_path: self.paths.sdk.clone(),
            resource_dir: self.paths.resource_dir.clone(),
            import_search_paths: self.paths.import_search_paths.clone(),
            framework_search_paths: self.paths.framework_search_paths.clone(),
            module_cache_path: Some(self.paths.cache_dir.clone()),
            debugger_support: self.build.debugger_support,
            ..BuildOptions::default()
        }
    }
}
