//! Error types for configuration loading and flag parsing.

/// Errors that can occur when loading or validating an `iface.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Errors produced while tokenizing or applying a module flag string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgsError {
    /// A quoted section was opened but never closed.
    #[error("unterminated {0} quote in flag string")]
    UnterminatedQuote(char),

    /// The flag string ended with a lone backslash.
    #[error("trailing backslash in flag string")]
    TrailingEscape,

    /// A flag is not recognised.
    #[error("unknown argument '{0}'")]
    UnknownFlag(String),

    /// A flag that takes a value was the last token.
    #[error("missing argument value for '{0}'")]
    MissingValue(String),

    /// A bare argument appeared where only flags are accepted.
    #[error("unexpected input '{0}' in module flags")]
    UnexpectedArgument(String),
}
