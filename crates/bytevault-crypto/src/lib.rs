//! # bytevault-crypto
//!
//! Hashing primitives for bytevault.
//!
//! - Keccak-256 hashing (content addressing of stored code)
//! - CREATE-style address derivation for newly deployed storage units

#![warn(missing_docs)]
#![warn(clippy::all)]

mod create;
mod hash;

pub use create::create_address;
pub use hash::{keccak256, EMPTY_CODE_HASH};
