//! The compiled artifact file format.
//!
//! An artifact is a little-endian `u32` header length, a bincode-encoded
//! [`ArtifactHeader`], then the opaque payload produced by the backend. The
//! header carries the module name and the dependency ledger the artifact was
//! built from, plus a checksum of the payload so truncated or tampered files
//! read as corrupt rather than as valid modules.

use std::fmt;

use iface_common::Fingerprint;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::ledger::DependencyLedger;

/// Magic bytes identifying a compiled module artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"IFCM";

/// Current artifact format version. Increment on breaking changes to the
/// header or payload layout.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every compiled artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Magic bytes: must be `b"IFCM"`.
    pub magic: [u8; 4],
    /// Artifact format version.
    pub format_version: u32,
    /// Toolchain that produced this artifact.
    pub toolchain_version: String,
    /// Name of the module inside.
    pub module_name: String,
    /// Every file the artifact was built from, flattened.
    pub dependencies: DependencyLedger,
    /// Fingerprint of the payload.
    pub checksum: Fingerprint,
}

/// Outcome of reading an artifact's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// The artifact is intact.
    Valid,
    /// The file is shorter than its declared header.
    Truncated,
    /// The header does not decode.
    Malformed,
    /// The file is not an artifact.
    BadMagic,
    /// The artifact was written in another format version.
    FormatMismatch,
    /// The payload does not match its recorded checksum.
    ChecksumMismatch,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Truncated => "truncated file",
            ValidationStatus::Malformed => "malformed header",
            ValidationStatus::BadMagic => "not a compiled module",
            ValidationStatus::FormatMismatch => "unsupported artifact format",
            ValidationStatus::ChecksumMismatch => "checksum mismatch",
        };
        f.write_str(s)
    }
}

/// A decoded artifact borrowing its payload from the file buffer.
#[derive(Debug)]
pub struct DecodedArtifact<'a> {
    /// The validated header.
    pub header: ArtifactHeader,
    /// The backend payload.
    pub payload: &'a [u8],
}

/// What validation learned about an artifact buffer.
#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    /// Whether the artifact is intact.
    pub status: ValidationStatus,
    /// Embedded module name; empty unless `status` is valid.
    pub module_name: String,
    /// Embedded ledger; empty unless `status` is valid.
    pub dependencies: DependencyLedger,
}

/// Encodes an artifact for `module_name` with `ledger` embedded.
pub fn encode_artifact(
    module_name: &str,
    toolchain_version: &str,
    ledger: &DependencyLedger,
    payload: &[u8],
) -> Result<Vec<u8>, CacheError> {
    let header = ArtifactHeader {
        magic: ARTIFACT_MAGIC,
        format_version: ARTIFACT_FORMAT_VERSION,
        toolchain_version: toolchain_version.to_string(),
        module_name: module_name.to_string(),
        dependencies: ledger.clone(),
        checksum: Fingerprint::of(payload),
    };
    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
    let header_len = u32::try_from(header_bytes.len()).map_err(|_| CacheError::Serialization {
        reason: format!("artifact header of {} bytes is too large", header_bytes.len()),
    })?;

    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(payload);
    Ok(output)
}

/// Decodes and fully validates an artifact buffer.
pub fn decode_artifact(raw: &[u8]) -> Result<DecodedArtifact<'_>, ValidationStatus> {
    let len_bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(ValidationStatus::Truncated)?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let header_end = 4usize
        .checked_add(header_len)
        .filter(|end| *end <= raw.len())
        .ok_or(ValidationStatus::Truncated)?;

    let (header, _): (ArtifactHeader, usize) =
        bincode::serde::decode_from_slice(&raw[4..header_end], bincode::config::standard())
            .map_err(|_| ValidationStatus::Malformed)?;

    if header.magic != ARTIFACT_MAGIC {
        return Err(ValidationStatus::BadMagic);
    }
    if header.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ValidationStatus::FormatMismatch);
    }
    let payload = &raw[header_end..];
    if !header.checksum.matches(payload) {
        return Err(ValidationStatus::ChecksumMismatch);
    }
    Ok(DecodedArtifact { header, payload })
}

/// Reads the validity, module name, and ledger of an artifact buffer.
pub fn validate_artifact(raw: &[u8]) -> ArtifactInfo {
    match decode_artifact(raw) {
        Ok(decoded) => ArtifactInfo {
            status: ValidationStatus::Valid,
            module_name: decoded.header.module_name,
            dependencies: decoded.header.dependencies,
        },
        Err(status) => ArtifactInfo {
            status,
            module_name: String::new(),
            dependencies: DependencyLedger::new(),
        },
    }
}
