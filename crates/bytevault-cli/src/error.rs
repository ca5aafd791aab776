//! CLI error types

use bytevault_core::BytecodeStorageError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage error
    #[error("{kind}: {0}", kind = .0.kind())]
    Storage(#[from] BytecodeStorageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}

impl CliError {
    /// Short error kind for JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::InvalidAddress(_) => "InvalidAddress",
            CliError::InvalidHex(_) => "InvalidHex",
            CliError::InvalidInput(_) => "InvalidInput",
            CliError::Storage(e) => e.kind(),
            CliError::Io(_) => "Io",
            CliError::Config(_) => "Config",
        }
    }
}
