//! # bytevault-state
//!
//! Account and code state for bytevault.
//!
//! This crate provides:
//! - The [`Account`] record kept for every writer and storage unit
//! - [`StateReader`]/[`StateWriter`] access traits
//! - A change set ([`StateCache`]) and a layered view ([`CachedState`]) used
//!   to stage one operation and commit it atomically
//! - Two [`StateBackend`]s: [`MemoryState`] and the RocksDB-backed [`StateDb`]

#![warn(missing_docs)]
#![warn(clippy::all)]

mod account;
pub mod db;
mod error;
mod memory;
mod state;

pub use account::{Account, StateBackend, StateReader, StateWriter};
pub use db::{Database, DbConfig};
pub use error::{StateError, StateResult};
pub use memory::MemoryState;
pub use state::{CachedState, StateCache, StateDb};
