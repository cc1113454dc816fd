//! The interface loader: decides between a shipped artifact, a cached
//! artifact, and a fresh rebuild.

use std::io;
use std::path::{Path, PathBuf};

use iface_config::{BuildOptions, HostConfig, LoadMode};
use iface_diagnostics::DiagnosticSink;
use iface_source::Span;
use tracing::{debug, info, warn};

use crate::artifact::{decode_artifact, validate_artifact, ValidationStatus};
use crate::backend::CompileBackend;
use crate::error::{CacheError, LoadError};
use crate::fs::{DependencyTracker, FileSystem};
use crate::interface::INTERFACE_EXTENSION;
use crate::key::{cached_output_path, CacheKey, KeyConfig};
use crate::rebuild::Rebuilder;
use crate::sub_build::{configure_inputs_and_outputs, derive_sub_build};
use crate::validate::is_up_to_date;

/// A module being requested, and where it was requested from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentity {
    /// The module name.
    pub name: String,
    /// Location of the import, used for diagnostics.
    pub span: Span,
}

impl ModuleIdentity {
    /// Creates an identity for `name` requested at `span`.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// The load modes under which this loader takes part.
///
/// [`LoadMode::OnlySerialized`] has no counterpart: under it the host never
/// constructs an interface loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceLoadMode {
    /// Leave a valid shipped artifact to the serialized loader.
    PreferSerialized,
    /// Always go through the interface and the cache.
    PreferInterface,
}

impl InterfaceLoadMode {
    /// Maps the configured load mode, or `None` if interfaces are not used.
    pub fn from_load_mode(mode: LoadMode) -> Option<Self> {
        match mode {
            LoadMode::PreferSerialized => Some(Self::PreferSerialized),
            LoadMode::PreferInterface => Some(Self::PreferInterface),
            LoadMode::OnlySerialized => None,
        }
    }
}

/// A compiled module ready for the serialized loading path.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// The cached artifact the module was read from.
    pub artifact_path: PathBuf,
    /// The backend payload of the artifact.
    pub payload: Vec<u8>,
    /// Whether this request rebuilt the artifact.
    pub rebuilt: bool,
}

/// Why the loader declined a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    /// No interface file exists for the module.
    NoInterface,
    /// A shipped artifact sits next to the interface and the load mode
    /// prefers it.
    AdjacentArtifact,
}

/// The result of a load request.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The module was loaded through the cache.
    Loaded(LoadedModule),
    /// This loader does not apply; the next loader in the chain should try.
    Deferred(DeferReason),
}

/// Loads modules from their textual interfaces through the shared cache.
pub struct InterfaceLoader<'a, B: CompileBackend> {
    fs: &'a dyn FileSystem,
    backend: &'a B,
    diags: &'a DiagnosticSink,
    tracker: Option<&'a dyn DependencyTracker>,
    host: BuildOptions,
    cache_dir: PathBuf,
    toolchain_version: String,
    mode: InterfaceLoadMode,
}

impl<'a, B: CompileBackend> InterfaceLoader<'a, B> {
    /// Creates a loader caching into `cache_dir`, deriving every rebuild
    /// from `host`.
    pub fn new(
        fs: &'a dyn FileSystem,
        backend: &'a B,
        diags: &'a DiagnosticSink,
        host: BuildOptions,
        cache_dir: impl Into<PathBuf>,
        toolchain_version: impl Into<String>,
        mode: InterfaceLoadMode,
    ) -> Self {
        Self {
            fs,
            backend,
            diags,
            tracker: None,
            host,
            cache_dir: cache_dir.into(),
            toolchain_version: toolchain_version.into(),
            mode,
        }
    }

    /// Creates a loader from the host configuration file. Returns `None`
    /// when the configured mode never loads from interfaces.
    pub fn from_config(
        fs: &'a dyn FileSystem,
        backend: &'a B,
        diags: &'a DiagnosticSink,
        config: &HostConfig,
    ) -> Option<Self> {
        let mode = InterfaceLoadMode::from_load_mode(config.loader.mode)?;
        Some(Self::new(
            fs,
            backend,
            diags,
            config.build_options(),
            config.paths.cache_dir.clone(),
            config.toolchain.version.clone(),
            mode,
        ))
    }

    /// Reports every file read or validated to `tracker`.
    pub fn with_tracker(mut self, tracker: &'a dyn DependencyTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// The shared cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where the artifact for `identity`, built from `interface_path`, is
    /// cached.
    pub fn cached_artifact_path(&self, identity: &ModuleIdentity, interface_path: &Path) -> PathBuf {
        let key = CacheKey::compute(
            &self.toolchain_version,
            interface_path,
            &KeyConfig::from(&self.host),
        );
        cached_output_path(&self.cache_dir, &identity.name, key)
    }

    /// Loads `identity`, whose shipped artifact would be `module_file_name`
    /// in `dir`.
    ///
    /// The interface is looked for next to it, with the interface extension.
    /// Once an interface exists and no shipped artifact is preferred, the
    /// loader owns the outcome: a failed rebuild is an error, never a
    /// deferral.
    pub fn load(
        &self,
        identity: &ModuleIdentity,
        dir: &Path,
        module_file_name: &str,
    ) -> Result<LoadOutcome, LoadError> {
        let module_path = dir.join(module_file_name);
        let interface_path = module_path.with_extension(INTERFACE_EXTENSION);

        if !self.fs.exists(&interface_path) {
            debug!(module = %identity.name, path = %interface_path.display(), "no interface");
            return Ok(LoadOutcome::Deferred(DeferReason::NoInterface));
        }

        if self.mode == InterfaceLoadMode::PreferSerialized && self.adjacent_is_usable(&module_path) {
            debug!(module = %identity.name, path = %module_path.display(), "deferring to shipped artifact");
            return Ok(LoadOutcome::Deferred(DeferReason::AdjacentArtifact));
        }

        let artifact_path = self.cached_artifact_path(identity, &interface_path);
        let rebuilt = if is_up_to_date(self.fs, &identity.name, &artifact_path, self.tracker) {
            info!(module = %identity.name, artifact = %artifact_path.display(), "cached module is up to date");
            false
        } else {
            let mut options = derive_sub_build(&self.host, &identity.name, Some(self.cache_dir.as_path()));
            configure_inputs_and_outputs(&mut options, &interface_path, &artifact_path);

            let mut rebuilder = Rebuilder::new(self.fs, self.backend, self.diags, &self.toolchain_version)
                .with_cache_dir(&self.cache_dir)
                .at(identity.span);
            if let Some(tracker) = self.tracker {
                rebuilder = rebuilder.with_tracker(tracker);
            }
            rebuilder
                .rebuild(options)
                .map_err(|source| LoadError::InvalidInterface {
                    module: identity.name.clone(),
                    source,
                })?;
            true
        };

        let payload = self.read_artifact(&artifact_path)?;
        Ok(LoadOutcome::Loaded(LoadedModule {
            artifact_path,
            payload,
            rebuilt,
        }))
    }

    // Only the artifact's own integrity is checked here, not its
    // dependencies. An artifact that exists but cannot be read is left to
    // the serialized loader too, so that it reports the problem.
    fn adjacent_is_usable(&self, module_path: &Path) -> bool {
        match self.fs.read(module_path) {
            Ok(raw) => {
                let status = validate_artifact(&raw).status;
                if status != ValidationStatus::Valid {
                    warn!(path = %module_path.display(), %status, "ignoring corrupt shipped artifact");
                }
                status == ValidationStatus::Valid
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                debug!(path = %module_path.display(), %err, "shipped artifact is unreadable");
                true
            }
        }
    }

    fn read_artifact(&self, path: &Path) -> Result<Vec<u8>, CacheError> {
        let raw = self.fs.read(path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = decode_artifact(&raw).map_err(|status| CacheError::Corrupt {
            path: path.to_path_buf(),
            status,
        })?;
        Ok(decoded.payload.to_vec())
    }
}
