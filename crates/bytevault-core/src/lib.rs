//! # bytevault-core
//!
//! Versioned bytecode storage.
//!
//! Payloads are framed with a version header and deployed as the code of a
//! fresh account; the account's address is the handle. Any reader release
//! can decode every format that predates it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bytevault_core::{BytecodeReader, BytecodeWriter, Ledger, StoreConfig, UnitStore};
//! use bytevault_primitives::Address;
//!
//! let config = StoreConfig::default();
//! let store: Arc<dyn UnitStore> = Arc::new(Ledger::in_memory(config.max_code_size));
//! let writer = BytecodeWriter::from_config(store.clone(), Address::from_bytes([0x11; 20]), &config);
//! let reader = BytecodeReader::new(store);
//!
//! let unit = writer.write_string("console.log(hello world)")?;
//! assert_eq!(reader.read_string(&unit)?, "console.log(hello world)");
//! # Ok::<(), bytevault_core::BytecodeStorageError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compression;
mod config;
mod error;
mod ledger;
mod reader;
mod scripts;
mod store;
mod writer;

pub use config::StoreConfig;
pub use error::{BytecodeStorageError, DeleteFailure, ReadFailure, Result, UnitField, WriteFailure};
pub use ledger::{Ledger, CONTRACT_START_NONCE, MAX_CODE_SIZE};
pub use reader::{BytecodeReader, ReaderRelease, UnitInfo};
pub use scripts::ScriptSlots;
pub use store::UnitStore;
pub use writer::BytecodeWriter;

pub use bytevault_format::{FormatVersion, VersionTag};
