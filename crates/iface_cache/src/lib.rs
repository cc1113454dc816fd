//! Module-interface build cache.
//!
//! Given the textual interface of a library, this crate produces a compiled
//! artifact usable by downstream compilations and caches it in a shared
//! directory. Every request decides whether the cached artifact is still
//! valid by re-fingerprinting the dependency ledger embedded in it, and
//! rebuilds it when it is not. Rebuilds run behind a crash-isolation
//! boundary so a faulty interface or backend cannot take down the host.
//!
//! The entry point is [`InterfaceLoader`]; the pieces it is made of
//! ([`CacheKey`], [`is_up_to_date`], [`DependencyCollector`], [`Rebuilder`])
//! are public so build tools can drive them directly.

#![warn(missing_docs)]

pub mod artifact;
pub mod backend;
pub mod collect;
pub mod diagnostics;
pub mod error;
pub mod fs;
pub mod interface;
pub mod key;
pub mod ledger;
pub mod loader;
pub mod rebuild;
pub mod sub_build;
pub mod validate;

pub use artifact::{
    decode_artifact, encode_artifact, validate_artifact, ArtifactInfo, DecodedArtifact,
    ValidationStatus,
};
pub use backend::{Analysis, CompileBackend, CompileFailure};
pub use collect::DependencyCollector;
pub use error::{CacheError, FailureKind, LoadError, RebuildError};
pub use fs::{DependencyTracker, FileSystem, RealFileSystem, RecordingTracker};
pub use interface::{
    extract_header, write_interface_header, FormatVersion, HeaderError, InterfaceHeader,
};
pub use key::{cached_output_path, CacheKey, KeyConfig};
pub use ledger::{DependencyLedger, FileDependency};
pub use loader::{
    DeferReason, InterfaceLoadMode, InterfaceLoader, LoadOutcome, LoadedModule, ModuleIdentity,
};
pub use rebuild::{build_from_interface, RebuildOutput, Rebuilder};
pub use sub_build::{configure_inputs_and_outputs, derive_sub_build};
pub use validate::is_up_to_date;
