//! Reading and writing the header lines of interface-text files.
//!
//! An interface file carries, anywhere in its text, one line each of:
//!
//! ```text
//! // format-version: 1.0
//! // toolchain-version: <full toolchain version, informational>
//! // module-flags: -module-name Foo -target arm64-apple-macos13
//! ```

use std::fmt;
use std::io;
use std::sync::LazyLock;

use regex::Regex;

/// Extension of interface-text files.
pub const INTERFACE_EXTENSION: &str = "interfacetext";

/// Extension of compiled module artifacts.
pub const ARTIFACT_EXTENSION: &str = "artifact";

/// Header key of the format version line.
pub const FORMAT_VERSION_KEY: &str = "format-version";

/// Header key of the informational toolchain version line.
pub const TOOLCHAIN_VERSION_KEY: &str = "toolchain-version";

/// Header key of the module flags line.
pub const MODULE_FLAGS_KEY: &str = "module-flags";

static FORMAT_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^// format-version: ([0-9.]+)\r?$").expect("format-version pattern is valid")
});

static MODULE_FLAGS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^// module-flags: ([^\r\n]*)").expect("module-flags pattern is valid")
});

/// A dotted interface format version. Missing components read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    /// Incompatible format changes.
    pub major: u32,
    /// Compatible additions.
    pub minor: u32,
    /// Fixes.
    pub patch: u32,
}

impl FormatVersion {
    /// The format version this toolchain writes and reads.
    pub const CURRENT: FormatVersion = FormatVersion::new(1, 0);

    /// Creates `major.minor`.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: 0,
        }
    }

    /// Returns `true` if an interface of this version can be rebuilt by a
    /// toolchain supporting `supported`. Minor and patch differences are
    /// tolerated.
    pub fn is_compatible_with(&self, supported: FormatVersion) -> bool {
        self.major == supported.major
    }
}

impl std::str::FromStr for FormatVersion {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HeaderError::InvalidVersion(s.to_string());
        let parts = s
            .split('.')
            .map(|c| c.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [major] => Ok(Self::new(*major, 0)),
            [major, minor] => Ok(Self::new(*major, *minor)),
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: *patch,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        Ok(())
    }
}

/// Why an interface header could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    /// No `// format-version:` line.
    #[error("could not extract format version")]
    MissingFormatVersion,
    /// No `// module-flags:` line.
    #[error("could not extract module flags")]
    MissingModuleFlags,
    /// The format version line does not hold a dotted version.
    #[error("invalid format version '{0}'")]
    InvalidVersion(String),
}

/// The rebuild-relevant content of an interface header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceHeader {
    /// Declared format version.
    pub format_version: FormatVersion,
    /// The raw, untokenized module flag string.
    pub module_flags: String,
}

/// Extracts the format version and module flags from interface text.
///
/// The two lines are matched independently and may appear anywhere, each
/// anchored at the start of a line; the first match of each wins.
pub fn extract_header(text: &str) -> Result<InterfaceHeader, HeaderError> {
    let version = FORMAT_VERSION_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or(HeaderError::MissingFormatVersion)?;
    let flags = MODULE_FLAGS_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or(HeaderError::MissingModuleFlags)?;

    Ok(InterfaceHeader {
        format_version: version.as_str().parse()?,
        module_flags: flags.as_str().trim_end().to_string(),
    })
}

/// Writes the header lines an interface file starts with.
pub fn write_interface_header<W: io::Write>(
    out: &mut W,
    toolchain_version: &str,
    module_flags: &str,
) -> io::Result<()> {
    writeln!(out, "// {FORMAT_VERSION_KEY}: {}", FormatVersion::CURRENT)?;
    writeln!(out, "// {TOOLCHAIN_VERSION_KEY}: {toolchain_version}")?;
    writeln!(out, "// {MODULE_FLAGS_KEY}: {module_flags}")
}
