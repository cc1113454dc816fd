//! Structured diagnostics for module loading and interface rebuilding.
//!
//! The cache never prints. Every user-facing failure becomes a [`Diagnostic`]
//! with a stable [`DiagnosticCode`], emitted into a thread-safe
//! [`DiagnosticSink`] owned by the host, which decides how to render it.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Severity};
pub use sink::DiagnosticSink;
