//! Diagnostic codes for module loading and interface rebuilding.
//!
//! Error codes `E301`--`E313` cover every way a rebuild can fail. Each
//! [`RebuildError`] is reported exactly once, at the rebuild boundary, at the
//! location of the import that requested the module.

use iface_diagnostics::{Diagnostic, DiagnosticCode};
use iface_source::Span;

use crate::error::RebuildError;
use crate::interface::HeaderError;

/// The interface file could not be opened.
pub const E301: DiagnosticCode = DiagnosticCode::error(301);

/// The interface lacks a readable `format-version` line.
pub const E302: DiagnosticCode = DiagnosticCode::error(302);

/// The interface lacks a `module-flags` line.
pub const E303: DiagnosticCode = DiagnosticCode::error(303);

/// The interface format's major version is not supported.
pub const E304: DiagnosticCode = DiagnosticCode::error(304);

/// The interface's module flags are malformed.
pub const E305: DiagnosticCode = DiagnosticCode::error(305);

/// The interface declares a different module name.
pub const E306: DiagnosticCode = DiagnosticCode::error(306);

/// The interface declares a different module name (debugger session).
pub const E307: DiagnosticCode = DiagnosticCode::error(307);

/// A dependency of the interface could not be read.
pub const E308: DiagnosticCode = DiagnosticCode::error(308);

/// A nested cached module could not be read for its dependencies.
pub const E309: DiagnosticCode = DiagnosticCode::error(309);

/// The interface failed to compile.
pub const E310: DiagnosticCode = DiagnosticCode::error(310);

/// The compiled module could not be written.
pub const E311: DiagnosticCode = DiagnosticCode::error(311);

/// The rebuild crashed.
pub const E312: DiagnosticCode = DiagnosticCode::error(312);

/// The rebuild could not be started.
pub const E313: DiagnosticCode = DiagnosticCode::error(313);

impl RebuildError {
    /// Returns the diagnostic code this error is reported under.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            RebuildError::OpenInput { .. } => E301,
            RebuildError::MalformedInterface {
                reason: HeaderError::MissingModuleFlags,
                ..
            } => E303,
            RebuildError::MalformedInterface { .. } => E302,
            RebuildError::UnsupportedVersion { .. } => E304,
            RebuildError::ArgumentParse { .. } => E305,
            RebuildError::IdentityMismatch {
                debugger_support: true,
                ..
            } => E307,
            RebuildError::IdentityMismatch { .. } => E306,
            RebuildError::MissingDependency { .. } => E308,
            RebuildError::NestedArtifact { .. } => E309,
            RebuildError::Compile { .. } => E310,
            RebuildError::ArtifactWrite(_) => E311,
            RebuildError::InternalCrash { .. } => E312,
            RebuildError::Internal(_) => E313,
        }
    }

    /// Builds the user-facing diagnostic for this error, anchored at `span`.
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        let code = self.code();
        match self {
            RebuildError::IdentityMismatch {
                declared,
                expected,
                debugger_support: true,
            } => Diagnostic::error(
                code,
                format!("module '{expected}' was found, but its interface declares '{declared}'"),
                span,
            )
            .with_note("the module cannot be imported into this session under that name"),
            RebuildError::IdentityMismatch {
                declared, expected, ..
            } => Diagnostic::error(code, self.to_string(), span).with_note(format!(
                "the interface found for '{expected}' declares module '{declared}'"
            )),
            RebuildError::MissingDependency {
                dependency,
                interface,
                ..
            } => Diagnostic::error(
                code,
                format!(
                    "missing dependency '{}' of module interface '{}'",
                    dependency.display(),
                    interface.display()
                ),
                span,
            ),
            RebuildError::InternalCrash { .. } | RebuildError::Internal(_) => {
                Diagnostic::error(code, self.to_string(), span)
                    .with_note("this is a toolchain bug; the host build continues")
            }
            _ => Diagnostic::error(code, self.to_string(), span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::FormatVersion;
    use iface_diagnostics::Severity;
    use iface_source::FileId;
    use std::path::PathBuf;

    fn span() -> Span {
        Span::new(FileId::from_raw(1), 10, 20)
    }

    #[test]
    fn header_errors_split_by_line() {
        let missing_version = RebuildError::MalformedInterface {
            path: PathBuf::from("Foo.interfacetext"),
            reason: HeaderError::MissingFormatVersion,
        };
        let missing_flags = RebuildError::MalformedInterface {
            path: PathBuf::from("Foo.interfacetext"),
            reason: HeaderError::MissingModuleFlags,
        };
        assert_eq!(missing_version.code(), E302);
        assert_eq!(missing_flags.code(), E303);
    }

    #[test]
    fn unsupported_version_diagnostic() {
        let err = RebuildError::UnsupportedVersion {
            path: PathBuf::from("Foo.interfacetext"),
            found: FormatVersion::new(2, 0),
            supported: FormatVersion::CURRENT,
        };
        let diag = err.to_diagnostic(span());
        assert_eq!(diag.code, E304);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.primary_span, span());
        assert!(diag.message.contains("2.0"));
    }

    #[test]
    fn debugger_mismatch_uses_own_code() {
        let plain = RebuildError::IdentityMismatch {
            declared: "Bar".into(),
            expected: "Foo".into(),
            debugger_support: false,
        };
        let debugger = RebuildError::IdentityMismatch {
            declared: "Bar".into(),
            expected: "Foo".into(),
            debugger_support: true,
        };
        assert_eq!(plain.code(), E306);
        assert_eq!(debugger.code(), E307);
        assert_eq!(plain.to_diagnostic(span()).notes.len(), 1);
        assert!(debugger.to_diagnostic(span()).message.contains("declares 'Bar'"));
    }

    #[test]
    fn missing_dependency_names_both_paths() {
        let err = RebuildError::MissingDependency {
            dependency: PathBuf::from("lib/Base.interfacetext"),
            interface: PathBuf::from("lib/Foo.interfacetext"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let diag = err.to_diagnostic(span());
        assert_eq!(diag.code, E308);
        assert!(diag.message.contains("missing dependency"));
        assert!(diag.message.contains("Base.interfacetext"));
        assert!(diag.message.contains("Foo.interfacetext"));
    }

    #[test]
    fn crash_has_note() {
        let err = RebuildError::InternalCrash {
            message: "boom".into(),
        };
        let diag = err.to_diagnostic(span());
        assert_eq!(diag.code, E312);
        assert_eq!(diag.notes.len(), 1);
    }
}
