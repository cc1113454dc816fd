//! Error types for cache, rebuild, and load operations.

use std::path::PathBuf;

use iface_common::InternalError;
use iface_config::ArgsError;

use crate::artifact::ValidationStatus;
use crate::interface::{FormatVersion, HeaderError};

/// Errors raised while reading or writing cache files.
///
/// Reads on the validation path never surface these; a corrupt or missing
/// artifact is simply a cache miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An artifact header could not be encoded.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// An artifact file exists but does not validate.
    #[error("corrupt artifact at {path}: {status}")]
    Corrupt {
        /// The artifact file path.
        path: PathBuf,
        /// Why validation failed.
        status: ValidationStatus,
    },
}

/// The failure taxonomy a rebuild can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The interface file is unreadable or lacks its header lines.
    MalformedInterface,
    /// The interface's major format version is not supported.
    UnsupportedVersion,
    /// The interface's module flags could not be parsed.
    ArgumentParseError,
    /// The interface declares a different module than was requested.
    IdentityMismatch,
    /// A dependency, or a nested cached artifact, could not be read.
    DependencyExtractionError,
    /// Semantic analysis or code generation failed.
    CompileError,
    /// The rebuild terminated abnormally inside the isolation boundary.
    InternalCrash,
}

/// Why rebuilding a module from its interface failed.
///
/// Each variant is reported once through the diagnostic sink (see
/// [`crate::diagnostics`]) and then returned to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RebuildError {
    /// The interface file could not be read.
    #[error("cannot open interface file {path}: {source}")]
    OpenInput {
        /// The interface path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A required header line is missing or unparseable.
    #[error("malformed interface {path}: {reason}")]
    MalformedInterface {
        /// The interface path.
        path: PathBuf,
        /// Which header line was at fault.
        reason: HeaderError,
    },

    /// The interface was written in an incompatible format version.
    #[error("unsupported interface format version {found} in {path} (supported: {supported})")]
    UnsupportedVersion {
        /// The interface path.
        path: PathBuf,
        /// The version declared by the interface.
        found: FormatVersion,
        /// The version this toolchain writes.
        supported: FormatVersion,
    },

    /// The module flags embedded in the interface are malformed.
    #[error("invalid module flags in {path}: {source}")]
    ArgumentParse {
        /// The interface path.
        path: PathBuf,
        /// The tokenizer or flag-parser error.
        source: ArgsError,
    },

    /// The interface declares a different module name than requested.
    #[error("cannot load module '{declared}' as '{expected}'")]
    IdentityMismatch {
        /// The name declared by the interface flags.
        declared: String,
        /// The name the caller asked for.
        expected: String,
        /// Whether the request came from a debugger session.
        debugger_support: bool,
    },

    /// A dependency read by the rebuild could not be fingerprinted.
    #[error("missing dependency {dependency} of module interface {interface}: {source}")]
    MissingDependency {
        /// The dependency path.
        dependency: PathBuf,
        /// The interface being rebuilt.
        interface: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A nested cached artifact could not be read for ledger flattening.
    #[error("cannot extract dependencies from cached module {path}: {status}")]
    NestedArtifact {
        /// The nested artifact path.
        path: PathBuf,
        /// Why it did not validate.
        status: ValidationStatus,
    },

    /// The compile backend reported errors.
    #[error("failed to compile module '{module}': {message}")]
    Compile {
        /// The module being built.
        module: String,
        /// Description of the failure.
        message: String,
    },

    /// The compiled artifact could not be encoded or published.
    #[error("failed to write compiled module: {0}")]
    ArtifactWrite(#[from] CacheError),

    /// The rebuild panicked inside the isolation boundary.
    #[error("crash while rebuilding module from interface: {message}")]
    InternalCrash {
        /// The panic payload, if it was a string.
        message: String,
    },

    /// The isolation boundary itself could not be set up.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl RebuildError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            RebuildError::OpenInput { .. } | RebuildError::MalformedInterface { .. } => {
                FailureKind::MalformedInterface
            }
            RebuildError::UnsupportedVersion { .. } => FailureKind::UnsupportedVersion,
            RebuildError::ArgumentParse { .. } => FailureKind::ArgumentParseError,
            RebuildError::IdentityMismatch { .. } => FailureKind::IdentityMismatch,
            RebuildError::MissingDependency { .. } | RebuildError::NestedArtifact { .. } => {
                FailureKind::DependencyExtractionError
            }
            RebuildError::Compile { .. } | RebuildError::ArtifactWrite(_) => {
                FailureKind::CompileError
            }
            RebuildError::InternalCrash { .. } | RebuildError::Internal(_) => {
                FailureKind::InternalCrash
            }
        }
    }
}

/// Why a module load failed after the interface loader took ownership of it.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The interface could not be rebuilt into a compiled artifact.
    #[error("invalid interface for module '{module}'")]
    InvalidInterface {
        /// The requested module.
        module: String,
        /// The rebuild failure.
        #[source]
        source: RebuildError,
    },

    /// The cached artifact could not be opened by the serialized loader.
    #[error(transparent)]
    Artifact(#[from] CacheError),
}
