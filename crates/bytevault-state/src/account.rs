//! Account record and state access traits

use crate::error::{StateError, StateResult};
use crate::state::StateCache;
use bytevault_crypto::{keccak256, EMPTY_CODE_HASH};
use bytevault_primitives::{Address, H256};

/// Account data
///
/// Writers are accounts that only ever carry a nonce. Storage units are
/// accounts with code and a `creator`. A destroyed unit keeps its account as
/// a tombstone so the address can never be allocated again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Number of units this account has created
    pub nonce: u64,
    /// keccak256 of the code, or EMPTY_CODE_HASH if there is none
    pub code_hash: H256,
    /// Account that created this one (zero for writers)
    pub creator: Address,
    /// Code has been purged
    pub destroyed: bool,
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

impl Account {
    const ENCODED_LEN: usize = 8 + 32 + 20 + 1;

    /// Create a new empty account
    pub fn new() -> Self {
        Self {
            nonce: 0,
            code_hash: EMPTY_CODE_HASH,
            creator: Address::ZERO,
            destroyed: false,
        }
    }

    /// Account for a freshly created unit holding `code`
    pub fn with_code(creator: Address, code: &[u8]) -> Self {
        Self {
            nonce: 1,
            code_hash: keccak256(code),
            creator,
            destroyed: false,
        }
    }

    /// Check if account has code
    pub fn has_code(&self) -> bool {
        self.code_hash != EMPTY_CODE_HASH
    }

    /// Whether an account already occupies this address (EIP-684 collision rule)
    pub fn is_occupied(&self) -> bool {
        self.nonce != 0 || self.has_code() || self.destroyed
    }

    /// Serialize account to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::ENCODED_LEN);
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes.extend_from_slice(self.code_hash.as_bytes());
        bytes.extend_from_slice(self.creator.as_bytes());
        bytes.push(self.destroyed as u8);
        bytes
    }

    /// Deserialize account from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return None;
        }
        let nonce = u64::from_le_bytes(bytes[0..8].try_into().ok()?);
        let code_hash = H256::from_slice(&bytes[8..40]).ok()?;
        let creator = Address::from_slice(&bytes[40..60]).ok()?;
        let destroyed = match bytes[60] {
            0 => false,
            1 => true,
            _ => return None,
        };
        Some(Self {
            nonce,
            code_hash,
            creator,
            destroyed,
        })
    }
}

/// Read access to state
pub trait StateReader {
    /// Get account by address
    fn get_account(&self, address: &Address) -> StateResult<Option<Account>>;

    /// Get the raw code stored for an address
    fn get_code(&self, address: &Address) -> StateResult<Option<Vec<u8>>>;

    /// Get account nonce
    fn get_nonce(&self, address: &Address) -> StateResult<u64> {
        Ok(self.get_account(address)?.map(|a| a.nonce).unwrap_or(0))
    }

    /// Code deployed at `address`, verified against the account's code hash.
    /// Empty when nothing is deployed there.
    fn code_at(&self, address: &Address) -> StateResult<Vec<u8>> {
        let account = match self.get_account(address)? {
            Some(account) if account.has_code() => account,
            _ => return Ok(Vec::new()),
        };
        let code = self.get_code(address)?.unwrap_or_default();
        if keccak256(&code) != account.code_hash {
            return Err(StateError::CorruptCode(*address));
        }
        Ok(code)
    }
}

/// Write access to state
pub trait StateWriter {
    /// Set account
    fn set_account(&mut self, address: Address, account: Account) -> StateResult<()>;

    /// Set code for an address
    fn set_code(&mut self, address: Address, code: Vec<u8>) -> StateResult<()>;

    /// Remove code for an address
    fn delete_code(&mut self, address: &Address) -> StateResult<()>;

    /// Increment nonce, returning the new value
    fn increment_nonce(&mut self, address: &Address) -> StateResult<u64>
    where
        Self: StateReader,
    {
        let mut account = self.get_account(address)?.unwrap_or_default();
        account.nonce = account
            .nonce
            .checked_add(1)
            .ok_or(StateError::NonceOverflow(*address))?;
        let new_nonce = account.nonce;
        self.set_account(*address, account)?;
        Ok(new_nonce)
    }
}

/// Durable state that accepts a staged change set in one atomic step
pub trait StateBackend: StateReader + Send + Sync {
    /// Apply every change in `changes`, or none of them
    fn commit(&mut self, changes: StateCache) -> StateResult<()>;
}
