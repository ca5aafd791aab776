//! Compression codec for stored text.
//!
//! Raw DEFLATE streams. Compression sits above the read path: readers hand
//! back the compressed bytes untouched unless asked for decoded content.

use crate::error::{BytecodeStorageError, Result};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Default DEFLATE level
pub const DEFAULT_LEVEL: u32 = 9;

/// Compress `data` at the default level
pub fn compress(data: &str) -> Result<Vec<u8>> {
    compress_with_level(data, DEFAULT_LEVEL)
}

/// Compress `data` at `level` (0-9)
pub fn compress_with_level(data: &str, level: u32) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(BytecodeStorageError::OnlyNonEmptyString);
    }
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder
        .write_all(data.as_bytes())
        .map_err(|e| BytecodeStorageError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| BytecodeStorageError::Compression(e.to_string()))
}

/// Inverse of [`compress`]
pub fn decompress(data: &[u8]) -> Result<String> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| BytecodeStorageError::Compression(e.to_string()))?;
    String::from_utf8(out)
        .map_err(|_| BytecodeStorageError::Compression("decompressed data is not UTF-8".into()))
}
