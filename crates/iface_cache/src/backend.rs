//! The compile backend collaborator.

use std::path::PathBuf;

use iface_config::BuildOptions;
use iface_diagnostics::DiagnosticSink;

use crate::error::CacheError;

/// The result of semantic analysis.
#[derive(Debug)]
pub struct Analysis<M> {
    /// Every file the analysis read, in the order it read them.
    pub read_files: Vec<PathBuf>,
    /// Backend state carried into code generation.
    pub module: M,
}

/// A backend-reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileFailure {
    /// Description of what failed.
    pub message: String,
}

impl CompileFailure {
    /// Creates a failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns interface text into a compiled artifact.
///
/// Called once per rebuild, on the isolated rebuild thread: first
/// [`analyze`](Self::analyze), then [`generate`](Self::generate). Errors may be
/// reported either by returning `Err` or by emitting error diagnostics into
/// `diags`; both fail the rebuild.
pub trait CompileBackend: Sync {
    /// Backend-specific analyzed module.
    type Module;

    /// Runs semantic analysis over `options.input_path`.
    fn analyze(
        &self,
        options: &BuildOptions,
        diags: &DiagnosticSink,
    ) -> Result<Analysis<Self::Module>, CompileFailure>;

    /// Generates code for `module`.
    ///
    /// The backend must call `serialize` with the artifact payload at the
    /// point in its pipeline where the module is ready to be written. The
    /// dependency ledger is already wired into the callback.
    fn generate(
        &self,
        module: Self::Module,
        options: &BuildOptions,
        diags: &DiagnosticSink,
        serialize: &mut dyn FnMut(&[u8]) -> Result<(), CacheError>,
    ) -> Result<(), CompileFailure>;
}
