//! Subcommand implementations

pub mod read;
pub mod write;

use crate::{config::Config, CliError};
use bytevault_core::{BytecodeReader, BytecodeWriter, Ledger, UnitStore};
use bytevault_primitives::Address;
use std::sync::Arc;

/// Opened ledger plus the settings commands need
pub struct Context {
    store: Arc<dyn UnitStore>,
    config: Config,
}

impl Context {
    /// Open the ledger under the configured data directory
    pub fn open(config: Config) -> Result<Self, CliError> {
        let data_dir = config.data_dir()?;
        std::fs::create_dir_all(&data_dir)?;
        let ledger = Ledger::open(&data_dir, &config.store)?;
        tracing::debug!(data_dir = %data_dir.display(), "ledger ready");
        Ok(Self {
            store: Arc::new(ledger),
            config,
        })
    }

    /// Writer for the configured identity
    pub fn writer(&self) -> Result<BytecodeWriter, CliError> {
        Ok(BytecodeWriter::from_config(
            self.store.clone(),
            self.config.writer()?,
            &self.config.store,
        ))
    }

    /// Latest-release reader
    pub fn reader(&self) -> BytecodeReader {
        BytecodeReader::new(self.store.clone())
    }
}

/// Parse a unit address argument
pub fn parse_address(s: &str) -> Result<Address, CliError> {
    s.trim()
        .parse()
        .map_err(|e: bytevault_primitives::AddressError| CliError::InvalidAddress(format!("{}: {}", s, e)))
}
