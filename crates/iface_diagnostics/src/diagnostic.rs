//! A single reported problem.

use crate::code::DiagnosticCode;
use iface_source::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is. Errors fail the request that produced them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Reported, but the request carries on.
    Warning,
    /// The request fails.
    Error,
}

impl Severity {
    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A diagnostic, anchored at the import that requested the module being
/// loaded or rebuilt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Warning or error.
    pub severity: Severity,
    /// Stable code.
    pub code: DiagnosticCode,
    /// One-line description.
    pub message: String,
    /// Where the request came from.
    pub primary_span: Span,
    /// Follow-up lines shown under the message.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// An error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            primary_span: span,
            notes: Vec::new(),
        }
    }

    /// A warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message, span)
        }
    }

    /// Appends a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Renders as `error[E304]: message`, one `note:` line per note.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order() {
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error.is_error());
        assert!(!Severity::Warning.is_error());
    }

    #[test]
    fn warning_keeps_everything_but_severity() {
        let diag = Diagnostic::warning(DiagnosticCode::warning(2), "unused import", Span::DUMMY);
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.message, "unused import");
        assert!(diag.notes.is_empty());
    }

    #[test]
    fn display_with_notes() {
        let diag = Diagnostic::error(
            DiagnosticCode::error(306),
            "cannot load module 'Bar' as 'Foo'",
            Span::DUMMY,
        )
        .with_note("the interface declares module 'Bar'");
        assert_eq!(
            diag.to_string(),
            "error[E306]: cannot load module 'Bar' as 'Foo'\n  note: the interface declares module 'Bar'"
        );
    }
}
