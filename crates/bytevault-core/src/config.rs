//! Storage configuration

use crate::error::{BytecodeStorageError, Result};
use crate::ledger::MAX_CODE_SIZE;
use bytevault_format::{FormatDescriptor, FormatVersion};
use serde::{Deserialize, Serialize};

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Format new units are written with
    pub format: FormatVersion,
    /// Largest deployable code, header included
    pub max_code_size: usize,
    /// DEFLATE level (0-9)
    pub compression_level: u32,
    /// Purge a script's previous unit when it is replaced or removed
    pub purge_replaced: bool,
    /// Store project scripts compressed
    pub compress_scripts: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            format: FormatVersion::LATEST,
            max_code_size: MAX_CODE_SIZE,
            compression_level: 9,
            purge_replaced: true,
            compress_scripts: false,
        }
    }
}

impl StoreConfig {
    /// Reject settings no writer could honour
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > 9 {
            return Err(BytecodeStorageError::Config(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            )));
        }
        let header = FormatDescriptor::of(self.format).header_len();
        if self.max_code_size <= header {
            return Err(BytecodeStorageError::Config(format!(
                "max_code_size {} leaves no room for a payload behind the {} byte {} header",
                self.max_code_size, header, self.format
            )));
        }
        if self.compress_scripts && !FormatDescriptor::of(self.format).has_compression_flag() {
            return Err(BytecodeStorageError::Config(format!(
                "compress_scripts requires a format with a compression flag, not {}",
                self.format
            )));
        }
        Ok(())
    }

    /// Largest payload the configured format accepts
    pub fn max_payload(&self) -> usize {
        FormatDescriptor::of(self.format).max_payload(self.max_code_size)
    }
}
