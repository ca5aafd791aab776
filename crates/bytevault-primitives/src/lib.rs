//! # bytevault-primitives
//!
//! Primitive types for bytevault.
//!
//! Storage units are addressed the way ledger accounts are: by a 20-byte
//! [`Address`]. Code is content-addressed by a 32-byte [`H256`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};
