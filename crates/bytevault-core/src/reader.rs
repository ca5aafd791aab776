//! Multi-version storage reader

use crate::compression;
use crate::error::{BytecodeStorageError, ReadFailure, Result, UnitField};
use crate::store::UnitStore;
use bytevault_format::{
    detect, sstore2, FormatDescriptor, VersionTag, FORMAT_V0, FORMAT_V1, FORMAT_V2,
};
use bytevault_primitives::Address;
use std::sync::Arc;
use tracing::warn;

/// Reader releases. Each release knows the formats that existed when it
/// shipped and reports anything newer as unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderRelease {
    /// Reads V0 only
    V0,
    /// Reads V1 and V0
    V1,
    /// Reads V2, V1 and V0
    V2,
}

impl ReaderRelease {
    /// Newest release
    pub const LATEST: ReaderRelease = ReaderRelease::V2;

    /// Known formats, newest first
    pub fn formats(&self) -> Vec<&'static FormatDescriptor> {
        match self {
            ReaderRelease::V0 => vec![&FORMAT_V0],
            ReaderRelease::V1 => vec![&FORMAT_V1, &FORMAT_V0],
            ReaderRelease::V2 => vec![&FORMAT_V2, &FORMAT_V1, &FORMAT_V0],
        }
    }
}

/// Provenance of one unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitInfo {
    /// Unit address
    pub address: Address,
    /// Detected version, or the unknown sentinel
    pub version: VersionTag,
    /// Recorded author, when the format records one
    pub author: Option<Address>,
    /// Compression flag, when the format has one
    pub compressed: Option<bool>,
    /// Payload length
    pub payload_len: usize,
    /// Raw code length
    pub code_len: usize,
}

/// Decodes units written by any known format
#[derive(Clone)]
pub struct BytecodeReader {
    store: Arc<dyn UnitStore>,
    formats: Vec<&'static FormatDescriptor>,
}

impl BytecodeReader {
    /// Reader for the latest release
    pub fn new(store: Arc<dyn UnitStore>) -> Self {
        Self::with_release(store, ReaderRelease::LATEST)
    }

    /// Reader for a specific release
    pub fn with_release(store: Arc<dyn UnitStore>, release: ReaderRelease) -> Self {
        Self::with_formats(store, release.formats())
    }

    /// Reader over an explicit format list, tried in order
    pub fn with_formats(store: Arc<dyn UnitStore>, formats: Vec<&'static FormatDescriptor>) -> Self {
        Self { store, formats }
    }

    fn load(&self, address: &Address) -> Result<Vec<u8>> {
        let code = self.store.code(address)?;
        if code.is_empty() {
            return Err(BytecodeStorageError::read(*address, ReadFailure::NoCode));
        }
        Ok(code)
    }

    fn detect(&self, code: &[u8]) -> Option<&'static FormatDescriptor> {
        detect(code, &self.formats)
    }

    /// Version tag of the unit at `address`; the unknown sentinel when no
    /// known format matches
    pub fn version_of(&self, address: &Address) -> Result<VersionTag> {
        let code = self.load(address)?;
        Ok(self
            .detect(&code)
            .map(|d| d.tag())
            .unwrap_or(VersionTag::UNKNOWN))
    }

    /// Raw payload bytes, still compressed if the unit was written compressed.
    /// Unknown content is read as SSTORE2.
    pub fn read_payload(&self, address: &Address) -> Result<Vec<u8>> {
        let code = self.load(address)?;
        if let Some(format) = self.detect(&code) {
            return Ok(format.payload(&code).to_vec());
        }
        warn!(%address, "unknown format, reading as SSTORE2");
        sstore2::payload(&code)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| BytecodeStorageError::read(*address, ReadFailure::NotSstore2))
    }

    /// Payload as UTF-8 text, without decompression
    pub fn read_string(&self, address: &Address) -> Result<String> {
        String::from_utf8(self.read_payload(address)?)
            .map_err(|_| BytecodeStorageError::read(*address, ReadFailure::InvalidUtf8))
    }

    /// Stored text, decompressed when the unit is flagged compressed
    pub fn read_content(&self, address: &Address) -> Result<String> {
        let code = self.load(address)?;
        match self.detect(&code) {
            Some(format) if format.compression_flag(&code) == Some(true) => {
                compression::decompress(format.payload(&code))
            }
            _ => self.read_string(address),
        }
    }

    /// Author recorded in the header
    pub fn author_of(&self, address: &Address) -> Result<Address> {
        let code = self.load(address)?;
        let format = self.detect(&code);
        format
            .and_then(|f| f.author(&code))
            .ok_or_else(|| self.unsupported(address, format, UnitField::Author))
    }

    /// Compression flag recorded in the header
    pub fn is_compressed_of(&self, address: &Address) -> Result<bool> {
        let code = self.load(address)?;
        let format = self.detect(&code);
        format
            .and_then(|f| f.compression_flag(&code))
            .ok_or_else(|| self.unsupported(address, format, UnitField::CompressionFlag))
    }

    /// Bytes from `offset` to the end, bypassing format detection
    pub fn force_read_at(&self, address: &Address, offset: usize) -> Result<Vec<u8>> {
        let code = self.load(address)?;
        code.get(offset..).map(<[u8]>::to_vec).ok_or_else(|| {
            BytecodeStorageError::read(
                *address,
                ReadFailure::OffsetOutOfBounds {
                    offset,
                    len: code.len(),
                },
            )
        })
    }

    /// Everything the header says about the unit at `address`. Fails like
    /// [`read_payload`](Self::read_payload) on content that is not readable.
    pub fn describe(&self, address: &Address) -> Result<UnitInfo> {
        let code = self.load(address)?;
        let info = match self.detect(&code) {
            Some(format) => UnitInfo {
                address: *address,
                version: format.tag(),
                author: format.author(&code),
                compressed: format.compression_flag(&code),
                payload_len: format.payload(&code).len(),
                code_len: code.len(),
            },
            None => UnitInfo {
                address: *address,
                version: VersionTag::UNKNOWN,
                author: None,
                compressed: None,
                payload_len: sstore2::payload(&code)
                    .ok_or_else(|| BytecodeStorageError::read(*address, ReadFailure::NotSstore2))?
                    .len(),
                code_len: code.len(),
            },
        };
        Ok(info)
    }

    fn unsupported(
        &self,
        address: &Address,
        format: Option<&FormatDescriptor>,
        field: UnitField,
    ) -> BytecodeStorageError {
        BytecodeStorageError::UnsupportedVersion {
            address: *address,
            version: format.map(|f| f.tag()).unwrap_or(VersionTag::UNKNOWN),
            field,
        }
    }
}
