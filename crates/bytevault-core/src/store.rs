//! Backing store seam

use crate::error::Result;
use bytevault_primitives::Address;

/// Append-only store of immutable blobs keyed by address.
///
/// Writers and readers only see this interface; how a blob is persisted is
/// up to the implementation.
pub trait UnitStore: Send + Sync {
    /// Persist `code` as a new unit created by `creator` and return its address.
    /// Addresses are never reused.
    fn deploy(&self, creator: &Address, code: Vec<u8>) -> Result<Address>;

    /// Content at `address`; empty when nothing is there
    fn code(&self, address: &Address) -> Result<Vec<u8>>;

    /// Permanently remove the unit at `address` on behalf of `caller`
    fn destroy(&self, address: &Address, caller: &Address) -> Result<()>;

    /// Largest blob `deploy` accepts
    fn max_code_size(&self) -> usize;
}
