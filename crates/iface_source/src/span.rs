//! Import locations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A source file of the host compilation. The cache never resolves it, it
/// only hands it back inside diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Stands for "no file".
    pub const NONE: FileId = FileId(u32::MAX);

    /// Wraps the host's own file number.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The host's file number.
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

/// The byte range `start..end` of an import in a host source file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// File containing the import.
    pub file: FileId,
    /// First byte.
    pub start: u32,
    /// One past the last byte.
    pub end: u32,
}

impl Span {
    /// The location of requests that no import made, such as a build tool
    /// precompiling an interface directly.
    pub const DUMMY: Span = Span {
        file: FileId::NONE,
        start: 0,
        end: 0,
    };

    /// `start..end` in `file`.
    pub const fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Returns `true` for [`Span::DUMMY`] and any other span without a file.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::NONE
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dummy() {
            f.write_str("<no location>")
        } else {
            write!(f, "file#{}:{}..{}", self.file.as_raw(), self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_has_no_file() {
        assert!(Span::DUMMY.is_dummy());
        assert!(!Span::new(FileId::from_raw(0), 0, 0).is_dummy());
        assert_eq!(FileId::NONE.as_raw(), u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(Span::new(FileId::from_raw(3), 120, 130).to_string(), "file#3:120..130");
        assert_eq!(Span::DUMMY.to_string(), "<no location>");
    }

    #[test]
    fn serializes_as_plain_fields() {
        let span = Span::new(FileId::from_raw(1), 10, 20);
        let json = serde_json::to_string(&span).unwrap();
        assert_eq!(json, r#"{"file":1,"start":10,"end":20}"#);
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(span, back);
    }
}
