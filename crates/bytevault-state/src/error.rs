//! State error types

use bytevault_primitives::Address;
use thiserror::Error;

/// State errors
#[derive(Debug, Error)]
pub enum StateError {
    /// RocksDB error
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Deserialization error
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Invalid column family
    #[error("invalid column family: {0}")]
    InvalidColumnFamily(String),

    /// Database not open
    #[error("database not open")]
    NotOpen,

    /// Database already open
    #[error("database already open")]
    AlreadyOpen,

    /// Stored code does not hash to the account's code hash
    #[error("code at {0} does not match its recorded hash")]
    CorruptCode(Address),

    /// Nonce would overflow
    #[error("nonce overflow for {0}")]
    NonceOverflow(Address),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;
