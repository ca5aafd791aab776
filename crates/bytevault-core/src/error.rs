//! Storage error types

use bytevault_format::{FormatError, FormatVersion, VersionTag};
use bytevault_primitives::Address;
use bytevault_state::StateError;
use std::fmt;
use thiserror::Error;

/// Why a write was refused
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteFailure {
    /// Payload does not fit under the code size limit
    #[error("payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge {
        /// Payload length
        size: usize,
        /// Largest payload the format allows
        max: usize,
    },
    /// Framed code exceeds the deployable size
    #[error("code of {size} bytes exceeds the {max} byte limit")]
    CodeSizeExceeded {
        /// Code length
        size: usize,
        /// Deployable limit
        max: usize,
    },
    /// Derived address is already taken
    #[error("address {0} already in use")]
    AddressCollision(Address),
    /// Format has no compression flag
    #[error("format {0} cannot record compression")]
    CompressionUnsupported(FormatVersion),
}

/// Why a read failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadFailure {
    /// Nothing deployed (never written, or purged)
    #[error("no code deployed")]
    NoCode,
    /// Unknown content that is not SSTORE2-shaped either
    #[error("content is not SSTORE2-shaped")]
    NotSstore2,
    /// Forced offset lies past the end of the code
    #[error("offset {offset} is beyond code length {len}")]
    OffsetOutOfBounds {
        /// Requested offset
        offset: usize,
        /// Code length
        len: usize,
    },
    /// Payload is not valid UTF-8
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Why a purge was refused
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeleteFailure {
    /// Nothing deployed (never written, or already purged)
    #[error("no code deployed")]
    NoCode,
    /// Caller did not create the unit
    #[error("{caller} did not create this unit")]
    NotCreator {
        /// Writer that attempted the purge
        caller: Address,
    },
}

/// Header fields that only some formats define
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitField {
    /// Author address
    Author,
    /// Compression flag
    CompressionFlag,
}

impl fmt::Display for UnitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitField::Author => f.write_str("author"),
            UnitField::CompressionFlag => f.write_str("compression flag"),
        }
    }
}

/// Bytecode storage error
#[derive(Debug, Error)]
pub enum BytecodeStorageError {
    /// Empty byte payload
    #[error("only non-empty bytes")]
    OnlyNonEmptyBytes,

    /// Empty string payload
    #[error("only non-empty string")]
    OnlyNonEmptyString,

    /// Write refused
    #[error("write error: {0}")]
    Write(WriteFailure),

    /// Read failed
    #[error("read error at {address}: {reason}")]
    Read {
        /// Unit address
        address: Address,
        /// Cause
        reason: ReadFailure,
    },

    /// Field not defined by the unit's format
    #[error("unsupported version at {address}: {version} does not record the {field}")]
    UnsupportedVersion {
        /// Unit address
        address: Address,
        /// Detected version
        version: VersionTag,
        /// Requested field
        field: UnitField,
    },

    /// Purge refused
    #[error("delete error at {address}: {reason}")]
    Delete {
        /// Unit address
        address: Address,
        /// Cause
        reason: DeleteFailure,
    },

    /// Compression codec failure
    #[error("compression error: {0}")]
    Compression(String),

    /// Script slot does not exist
    #[error("script index {index} out of range for project {project} ({count} scripts)")]
    ScriptIndexOutOfRange {
        /// Project id
        project: u64,
        /// Requested index
        index: usize,
        /// Scripts present
        count: usize,
    },

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),

    /// Backing state error
    #[error("state error: {0}")]
    State(#[from] StateError),
}

impl BytecodeStorageError {
    /// Stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OnlyNonEmptyBytes => "OnlyNonEmptyBytes",
            Self::OnlyNonEmptyString => "OnlyNonEmptyString",
            Self::Write(_) => "WriteError",
            Self::Read { .. } => "ReadError",
            Self::UnsupportedVersion { .. } => "UnsupportedVersion",
            Self::Delete { .. } => "DeleteError",
            Self::Compression(_) => "CompressionError",
            Self::ScriptIndexOutOfRange { .. } => "ScriptIndexOutOfRange",
            Self::Config(_) => "ConfigError",
            Self::State(_) => "StateError",
        }
    }

    pub(crate) fn read(address: Address, reason: ReadFailure) -> Self {
        Self::Read { address, reason }
    }

    pub(crate) fn delete(address: Address, reason: DeleteFailure) -> Self {
        Self::Delete { address, reason }
    }
}

impl From<FormatError> for BytecodeStorageError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::OnlyNonEmptyBytes => Self::OnlyNonEmptyBytes,
            FormatError::CompressionUnsupported(version) => {
                Self::Write(WriteFailure::CompressionUnsupported(version))
            }
            FormatError::UnknownVersion(name) => Self::Config(format!("unknown format {}", name)),
        }
    }
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, BytecodeStorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let addr = Address::from_bytes([0x01; 20]);
        assert_eq!(BytecodeStorageError::OnlyNonEmptyString.kind(), "OnlyNonEmptyString");
        assert_eq!(
            BytecodeStorageError::read(addr, ReadFailure::NoCode).kind(),
            "ReadError"
        );
        assert_eq!(
            BytecodeStorageError::delete(addr, DeleteFailure::NoCode).kind(),
            "DeleteError"
        );
        assert_eq!(
            BytecodeStorageError::UnsupportedVersion {
                address: addr,
                version: VersionTag::V1,
                field: UnitField::CompressionFlag,
            }
            .kind(),
            "UnsupportedVersion"
        );
    }

    #[test]
    fn test_format_error_conversion() {
        let err: BytecodeStorageError = FormatError::OnlyNonEmptyBytes.into();
        assert!(matches!(err, BytecodeStorageError::OnlyNonEmptyBytes));

        let err: BytecodeStorageError =
            FormatError::CompressionUnsupported(FormatVersion::V1).into();
        assert!(matches!(
            err,
            BytecodeStorageError::Write(WriteFailure::CompressionUnsupported(FormatVersion::V1))
        ));
    }

    #[test]
    fn test_error_messages() {
        let addr = Address::from_bytes([0x02; 20]);
        let err = BytecodeStorageError::UnsupportedVersion {
            address: addr,
            version: VersionTag::UNKNOWN,
            field: UnitField::Author,
        };
        let msg = err.to_string();
        assert!(msg.contains("UNKNOWN_VERSION_STRING"));
        assert!(msg.contains("author"));
    }
}
