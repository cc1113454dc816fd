//! Source locations carried through module loading.
//!
//! A module request remembers where it was made (an `import` in some source
//! file) as a [`Span`], so that failures in loading or rebuilding that module
//! can be reported at the importing location.

#![warn(missing_docs)]

pub mod span;

pub use span::{FileId, Span};
