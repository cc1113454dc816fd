//! Rebuilding a compiled artifact from a module interface.
//!
//! A rebuild runs these steps in order, stopping at the first failure:
//!
//! 1. read the interface and extract its header lines;
//! 2. reject an unsupported major format version;
//! 3. tokenize the module flags and apply them to the build options;
//! 4. check that the flags name the module that was requested;
//! 5. analyze, collect the dependency ledger, then generate code, staging the
//!    artifact when the backend asks for it to be serialized;
//! 6. publish the staged artifact atomically.
//!
//! All of it runs on a dedicated scoped thread. A panic anywhere inside,
//! including in the backend, ends the rebuild with
//! [`RebuildError::InternalCrash`] and leaves the host running. Nothing is
//! written to the output path unless every step succeeded.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::thread;

use iface_common::InternalError;
use iface_config::{parse_args, tokenize_command_line, BuildOptions, OptLevel};
use iface_diagnostics::DiagnosticSink;
use iface_source::Span;
use tracing::{debug, info, warn};

use crate::artifact::encode_artifact;
use crate::backend::{CompileBackend, CompileFailure};
use crate::collect::DependencyCollector;
use crate::error::{CacheError, RebuildError};
use crate::fs::{DependencyTracker, FileSystem, RealFileSystem};
use crate::interface::{extract_header, FormatVersion};
use crate::ledger::DependencyLedger;
use crate::sub_build::{configure_inputs_and_outputs, derive_sub_build};

/// Stack size of the rebuild thread. Analysis of deeply nested interfaces
/// recurses far deeper than a default thread allows.
const REBUILD_STACK_SIZE: usize = 16 * 1024 * 1024;

/// A successfully published artifact.
#[derive(Debug, Clone)]
pub struct RebuildOutput {
    /// Where the artifact was written.
    pub artifact_path: PathBuf,
    /// The ledger embedded in it.
    pub ledger: DependencyLedger,
}

/// Runs interface rebuilds against one backend, filesystem and diagnostic
/// sink.
pub struct Rebuilder<'a, B: CompileBackend> {
    fs: &'a dyn FileSystem,
    backend: &'a B,
    diags: &'a DiagnosticSink,
    toolchain_version: &'a str,
    span: Span,
    cache_dir: Option<&'a Path>,
    tracker: Option<&'a dyn DependencyTracker>,
}

impl<'a, B: CompileBackend> Rebuilder<'a, B> {
    /// Creates a rebuilder with no shared cache directory and no tracker.
    pub fn new(
        fs: &'a dyn FileSystem,
        backend: &'a B,
        diags: &'a DiagnosticSink,
        toolchain_version: &'a str,
    ) -> Self {
        Self {
            fs,
            backend,
            diags,
            toolchain_version,
            span: Span::DUMMY,
            cache_dir: None,
            tracker: None,
        }
    }

    /// Sets the shared cache directory. It is created before each rebuild,
    /// and artifacts inside it are flattened into the ledger.
    pub fn with_cache_dir(mut self, cache_dir: &'a Path) -> Self {
        self.cache_dir = Some(cache_dir);
        self
    }

    /// Sets the tracker every collected dependency is reported to.
    pub fn with_tracker(mut self, tracker: &'a dyn DependencyTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Sets the location failures are reported at.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Rebuilds the interface at `options.input_path` into
    /// `options.module_output_path`.
    ///
    /// `options.module_name` is the name the caller expects the interface to
    /// declare. On failure the error is emitted once into the diagnostic
    /// sink before it is returned.
    pub fn rebuild(&self, options: BuildOptions) -> Result<RebuildOutput, RebuildError> {
        let module = options.module_name.clone();
        let result = self.isolated(options);
        match &result {
            Ok(output) => info!(
                module = %module,
                artifact = %output.artifact_path.display(),
                dependencies = output.ledger.len(),
                "rebuilt module from interface"
            ),
            Err(err) => {
                warn!(module = %module, kind = ?err.kind(), %err, "interface rebuild failed");
                self.diags.emit(err.to_diagnostic(self.span));
            }
        }
        result
    }

    fn isolated(&self, options: BuildOptions) -> Result<RebuildOutput, RebuildError> {
        thread::scope(|scope| -> Result<RebuildOutput, RebuildError> {
            let handle = thread::Builder::new()
                .name("interface-rebuild".to_string())
                .stack_size(REBUILD_STACK_SIZE)
                .spawn_scoped(scope, move || self.run(options))
                .map_err(|e| InternalError::new(format!("cannot start rebuild thread: {e}")))?;
            match handle.join() {
                Ok(result) => result,
                Err(payload) => Err(RebuildError::InternalCrash {
                    message: panic_message(payload.as_ref()),
                }),
            }
        })
    }

    fn run(&self, mut options: BuildOptions) -> Result<RebuildOutput, RebuildError> {
        let input = options
            .input_path
            .clone()
            .ok_or_else(|| InternalError::new("interface rebuild has no input path"))?;
        let output = options
            .module_output_path
            .clone()
            .ok_or_else(|| InternalError::new("interface rebuild has no output path"))?;
        let expected = options.module_name.clone();

        if let Some(cache_dir) = self.cache_dir {
            self.fs
                .create_dir_all(cache_dir)
                .map_err(|source| CacheError::Io {
                    path: cache_dir.to_path_buf(),
                    source,
                })?;
        }

        let bytes = self
            .fs
            .read(&input)
            .map_err(|source| RebuildError::OpenInput {
                path: input.clone(),
                source,
            })?;
        let text = String::from_utf8_lossy(&bytes);
        let header = extract_header(&text).map_err(|reason| RebuildError::MalformedInterface {
            path: input.clone(),
            reason,
        })?;
        debug!(
            input = %input.display(),
            version = %header.format_version,
            flags = %header.module_flags,
            "read interface header"
        );

        if !header.format_version.is_compatible_with(FormatVersion::CURRENT) {
            return Err(RebuildError::UnsupportedVersion {
                path: input,
                found: header.format_version,
                supported: FormatVersion::CURRENT,
            });
        }

        let args = tokenize_command_line(&header.module_flags).map_err(|source| {
            RebuildError::ArgumentParse {
                path: input.clone(),
                source,
            }
        })?;
        parse_args(&args, &mut options).map_err(|source| RebuildError::ArgumentParse {
            path: input.clone(),
            source,
        })?;

        if options.module_name != expected {
            return Err(RebuildError::IdentityMismatch {
                declared: options.module_name,
                expected,
                debugger_support: options.debugger_support,
            });
        }

        // Applied after the flags so an interface cannot lower it.
        options.optimization = OptLevel::Speed;

        let child = DiagnosticSink::new();
        let _forward = ForwardOnDrop {
            child: &child,
            parent: self.diags,
            suppress_warnings: options.suppress_warnings,
        };

        let analysis = self
            .backend
            .analyze(&options, &child)
            .map_err(|failure| compile_error(&expected, failure))?;
        check_errors(&expected, &child, "analysis")?;

        let ledger = DependencyCollector::new(self.fs, self.cache_dir, self.tracker)
            .collect(&analysis.read_files, &input)?;

        let mut staged = None;
        let mut serialize = |payload: &[u8]| -> Result<(), CacheError> {
            staged = Some(encode_artifact(&expected, self.toolchain_version, &ledger, payload)?);
            Ok(())
        };
        self.backend
            .generate(analysis.module, &options, &child, &mut serialize)
            .map_err(|failure| compile_error(&expected, failure))?;
        check_errors(&expected, &child, "code generation")?;

        let artifact = staged.ok_or_else(|| RebuildError::Compile {
            module: expected.clone(),
            message: "code generation produced no artifact".to_string(),
        })?;
        self.fs
            .write_atomic(&output, &artifact)
            .map_err(|source| CacheError::Io {
                path: output.clone(),
                source,
            })?;

        Ok(RebuildOutput {
            artifact_path: output,
            ledger,
        })
    }
}

/// Rebuilds `input` into `output` outside any shared cache.
///
/// Used by tools that precompile an interface explicitly. No nested artifact
/// is flattened and no dependency is tracked.
pub fn build_from_interface<B: CompileBackend>(
    backend: &B,
    diags: &DiagnosticSink,
    toolchain_version: &str,
    host: &BuildOptions,
    module_name: &str,
    input: &Path,
    output: &Path,
) -> Result<RebuildOutput, RebuildError> {
    let mut options = derive_sub_build(host, module_name, None);
    configure_inputs_and_outputs(&mut options, input, output);
    Rebuilder::new(&RealFileSystem, backend, diags, toolchain_version).rebuild(options)
}

/// Forwards the sub-build's diagnostics to the host on every exit path,
/// unwinding included.
struct ForwardOnDrop<'a> {
    child: &'a DiagnosticSink,
    parent: &'a DiagnosticSink,
    suppress_warnings: bool,
}

impl Drop for ForwardOnDrop<'_> {
    fn drop(&mut self) {
        self.child.forward_into(self.parent, self.suppress_warnings);
    }
}

fn compile_error(module: &str, failure: CompileFailure) -> RebuildError {
    RebuildError::Compile {
        module: module.to_string(),
        message: failure.message,
    }
}

fn check_errors(module: &str, diags: &DiagnosticSink, phase: &str) -> Result<(), RebuildError> {
    match diags.error_count() {
        0 => Ok(()),
        n => Err(RebuildError::Compile {
            module: module.to_string(),
            message: format!("{phase} reported {n} error(s)"),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::decode_artifact;
    use crate::backend::Analysis;
    use crate::error::FailureKind;
    use iface_diagnostics::{Diagnostic, DiagnosticCode, Severity};

    const WARNING: DiagnosticCode = DiagnosticCode::warning(1);

    #[derive(Default)]
    struct EchoBackend {
        warn: bool,
        panic_in_generate: bool,
    }

    impl CompileBackend for EchoBackend {
        type Module = Vec<u8>;

        fn analyze(
            &self,
            options: &BuildOptions,
            diags: &DiagnosticSink,
        ) -> Result<Analysis<Vec<u8>>, CompileFailure> {
            if self.warn {
                diags.emit(Diagnostic::warning(WARNING, "unused import", Span::DUMMY));
            }
            let input = options.input_path.clone().unwrap();
            let module = std::fs::read(&input).unwrap();
            Ok(Analysis {
                read_files: vec![input],
                module,
            })
        }

        fn generate(
            &self,
            module: Vec<u8>,
            options: &BuildOptions,
            _diags: &DiagnosticSink,
            serialize: &mut dyn FnMut(&[u8]) -> Result<(), CacheError>,
        ) -> Result<(), CompileFailure> {
            assert_eq!(options.optimization, OptLevel::Speed);
            serialize(&module).map_err(|e| CompileFailure::new(e.to_string()))?;
            if self.panic_in_generate {
                panic!("backend fault");
            }
            Ok(())
        }
    }

    fn interface(dir: &Path, flags: &str) -> PathBuf {
        let path = dir.join("Foo.interfacetext");
        let text = format!("// format-version: 1.0\n// module-flags: {flags}\nfunc foo()\n");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn standalone_build_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = interface(dir.path(), "-module-name Foo -O");
        let output = dir.path().join("Foo.artifact");
        let diags = DiagnosticSink::new();

        let built = build_from_interface(
            &EchoBackend::default(),
            &diags,
            "5.1",
            &BuildOptions::default(),
            "Foo",
            &input,
            &output,
        )
        .unwrap();

        assert_eq!(built.artifact_path, output);
        assert_eq!(built.ledger.paths(), vec![input]);
        let raw = std::fs::read(&output).unwrap();
        let decoded = decode_artifact(&raw).unwrap();
        assert_eq!(decoded.header.module_name, "Foo");
        assert!(decoded.payload.starts_with(b"// format-version"));
        assert!(!diags.has_errors());
    }

    #[test]
    fn suppressed_warnings_are_not_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let input = interface(dir.path(), "-module-name Foo");
        let output = dir.path().join("Foo.artifact");
        let diags = DiagnosticSink::new();
        let backend = EchoBackend {
            warn: true,
            ..EchoBackend::default()
        };

        build_from_interface(&backend, &diags, "5.1", &BuildOptions::default(), "Foo", &input, &output)
            .unwrap();
        assert!(diags.diagnostics().is_empty());
    }

    #[test]
    fn panic_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let input = interface(dir.path(), "-module-name Foo");
        let output = dir.path().join("Foo.artifact");
        let diags = DiagnosticSink::new();
        let backend = EchoBackend {
            panic_in_generate: true,
            ..EchoBackend::default()
        };

        let err = build_from_interface(&backend, &diags, "5.1", &BuildOptions::default(), "Foo", &input, &output)
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InternalCrash);
        assert!(err.to_string().contains("backend fault"));
        assert!(!output.exists());
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn bad_flags_are_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let input = interface(dir.path(), "-module-name Foo -no-such-flag");
        let output = dir.path().join("Foo.artifact");
        let diags = DiagnosticSink::new();

        let err = build_from_interface(
            &EchoBackend::default(),
            &diags,
            "5.1",
            &BuildOptions::default(),
            "Foo",
            &input,
            &output,
        )
        .unwrap_err();
        assert_eq!(err.kind(), FailureKind::ArgumentParseError);
        let reported = diags.take_all();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].severity, Severity::Error);
        assert_eq!(reported[0].code, crate::diagnostics::E305);
    }

    #[test]
    fn missing_input_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let diags = DiagnosticSink::new();
        let err = build_from_interface(
            &EchoBackend::default(),
            &diags,
            "5.1",
            &BuildOptions::default(),
            "Foo",
            &dir.path().join("Foo.interfacetext"),
            &dir.path().join("Foo.artifact"),
        )
        .unwrap_err();
        assert!(matches!(err, RebuildError::OpenInput { .. }));
        assert_eq!(err.kind(), FailureKind::MalformedInterface);
    }

    #[test]
    fn panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(s.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
