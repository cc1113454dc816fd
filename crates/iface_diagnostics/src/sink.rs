//! The diagnostic sink shared between the host and rebuild threads.

use crate::diagnostic::Diagnostic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects diagnostics from any thread.
///
/// Rebuilds run on their own thread and report into the host's sink, so
/// every method takes `&self`. Errors are also counted separately; the count
/// only grows, even when the collected diagnostics are drained.
#[derive(Default)]
pub struct DiagnosticSink {
    collected: Mutex<Vec<Diagnostic>>,
    errors: AtomicUsize,
}

impl DiagnosticSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    // A rebuild that panics mid-emit poisons the lock but cannot leave the
    // vector half-pushed.
    fn collected(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.collected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `diag`.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity.is_error() {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.collected().push(diag);
    }

    /// Returns `true` once any error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of errors emitted over the sink's lifetime.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Removes and returns everything collected so far.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.collected())
    }

    /// A copy of everything collected so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.collected().clone()
    }

    /// Moves everything collected here into `parent`, in order.
    ///
    /// With `suppress_warnings` only errors are moved and the rest is
    /// dropped. Returns how many diagnostics reached `parent`.
    pub fn forward_into(&self, parent: &DiagnosticSink, suppress_warnings: bool) -> usize {
        let kept: Vec<Diagnostic> = self
            .take_all()
            .into_iter()
            .filter(|diag| !suppress_warnings || diag.severity.is_error())
            .collect();
        let forwarded = kept.len();
        for diag in kept {
            parent.emit(diag);
        }
        forwarded
    }
}
