//! Storage writer

use crate::compression;
use crate::config::StoreConfig;
use crate::error::{BytecodeStorageError, Result, WriteFailure};
use crate::store::UnitStore;
use bytevault_format::{FormatDescriptor, FormatVersion};
use bytevault_primitives::Address;
use std::sync::Arc;
use tracing::{debug, info};

/// Writes framed units on behalf of one writer address.
///
/// The writer's address is recorded as the author of every unit it writes
/// (for formats that record one) and is the only identity allowed to purge
/// those units.
#[derive(Clone)]
pub struct BytecodeWriter {
    store: Arc<dyn UnitStore>,
    address: Address,
    format: &'static FormatDescriptor,
    compression_level: u32,
}

impl BytecodeWriter {
    /// Writer emitting `format` units
    pub fn new(store: Arc<dyn UnitStore>, address: Address, format: FormatVersion) -> Self {
        Self {
            store,
            address,
            format: FormatDescriptor::of(format),
            compression_level: compression::DEFAULT_LEVEL,
        }
    }

    /// Writer configured from a [`StoreConfig`]
    pub fn from_config(store: Arc<dyn UnitStore>, address: Address, config: &StoreConfig) -> Self {
        Self {
            compression_level: config.compression_level,
            ..Self::new(store, address, config.format)
        }
    }

    /// Writer identity
    pub fn address(&self) -> Address {
        self.address
    }

    /// Format this writer emits
    pub fn format(&self) -> FormatVersion {
        self.format.version
    }

    /// Largest payload accepted
    pub fn max_payload(&self) -> usize {
        self.format.max_payload(self.store.max_code_size())
    }

    /// Store `payload` uncompressed
    pub fn write(&self, payload: &[u8]) -> Result<Address> {
        self.write_with_flag(payload, false)
    }

    /// Store UTF-8 text uncompressed
    pub fn write_string(&self, text: &str) -> Result<Address> {
        if text.is_empty() {
            return Err(BytecodeStorageError::OnlyNonEmptyString);
        }
        self.write(text.as_bytes())
    }

    /// Compress `text` and store it with the compression flag set
    pub fn write_compressed(&self, text: &str) -> Result<Address> {
        if text.is_empty() {
            return Err(BytecodeStorageError::OnlyNonEmptyString);
        }
        if !self.format.has_compression_flag() {
            return Err(BytecodeStorageError::Write(WriteFailure::CompressionUnsupported(
                self.format.version,
            )));
        }
        let packed = compression::compress_with_level(text, self.compression_level)?;
        debug!(
            original = text.len(),
            compressed = packed.len(),
            "compressed payload"
        );
        self.write_with_flag(&packed, true)
    }

    /// Store `payload`, recording `compressed` in the header. For callers
    /// that already hold compressed bytes.
    pub fn write_with_flag(&self, payload: &[u8], compressed: bool) -> Result<Address> {
        if payload.is_empty() {
            return Err(BytecodeStorageError::OnlyNonEmptyBytes);
        }
        let max = self.max_payload();
        if payload.len() > max {
            return Err(BytecodeStorageError::Write(WriteFailure::PayloadTooLarge {
                size: payload.len(),
                max,
            }));
        }

        let code = self.format.frame(payload, compressed, &self.address)?;
        let address = self.store.deploy(&self.address, code)?;

        info!(
            writer = %self.address,
            unit = %address,
            format = %self.format.version,
            payload_len = payload.len(),
            compressed,
            "wrote unit"
        );
        Ok(address)
    }

    /// Remove a unit this writer created
    pub fn purge(&self, unit: &Address) -> Result<()> {
        self.store.destroy(unit, &self.address)?;
        info!(writer = %self.address, %unit, "purged unit");
        Ok(())
    }
}
