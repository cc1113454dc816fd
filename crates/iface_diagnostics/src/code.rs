//! Stable codes identifying each kind of diagnostic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a code names an error or a warning; decides its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Rendered as `E...`.
    Error,
    /// Rendered as `W...`.
    Warning,
}

impl Category {
    /// The prefix letter.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
        }
    }
}

/// A code such as `E304`. Codes never change meaning once assigned, so hosts
/// and tests can match on them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// Error or warning.
    pub category: Category,
    /// Number within the category, rendered with three digits.
    pub number: u16,
}

impl DiagnosticCode {
    /// An error code.
    pub const fn error(number: u16) -> Self {
        Self {
            category: Category::Error,
            number,
        }
    }

    /// A warning code.
    pub const fn warning(number: u16) -> Self {
        Self {
            category: Category::Warning,
            number,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_prefix_and_padding() {
        assert_eq!(DiagnosticCode::error(304).to_string(), "E304");
        assert_eq!(DiagnosticCode::warning(7).to_string(), "W007");
    }

    #[test]
    fn constructors_set_category() {
        assert_eq!(DiagnosticCode::error(1).category, Category::Error);
        assert_eq!(DiagnosticCode::warning(1).category, Category::Warning);
        assert_ne!(DiagnosticCode::error(1), DiagnosticCode::warning(1));
    }
}
