//! Framing errors

use crate::version::FormatVersion;
use thiserror::Error;

/// Framing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Payload was empty
    #[error("only non-empty bytes may be framed")]
    OnlyNonEmptyBytes,

    /// The format has no compression flag field
    #[error("format {0} has no compression flag")]
    CompressionUnsupported(FormatVersion),

    /// Unrecognized format name
    #[error("unknown format version: {0}")]
    UnknownVersion(String),
}

/// Result type for framing operations
pub type FormatResult<T> = Result<T, FormatError>;
