//! Shared foundational types used across the module-interface toolchain.
//!
//! This crate provides content fingerprinting for change detection and the
//! internal-error type for toolchain bugs.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod result;

pub use fingerprint::Fingerprint;
pub use result::InternalError;
