//! Account ledger that stores units as contract code

use crate::config::StoreConfig;
use crate::error::{BytecodeStorageError, DeleteFailure, Result, WriteFailure};
use crate::store::UnitStore;
use bytevault_crypto::{create_address, EMPTY_CODE_HASH};
use bytevault_primitives::Address;
use bytevault_state::{
    Account, CachedState, Database, MemoryState, StateBackend, StateDb, StateError, StateReader,
    StateWriter,
};
use parking_lot::RwLock;
use std::path::Path;
use tracing::{debug, info, trace};

/// EIP-170 runtime code limit
pub const MAX_CODE_SIZE: usize = 24_576;

/// Nonce of a creating account before its first deployment (EIP-161)
pub const CONTRACT_START_NONCE: u64 = 1;

/// Ledger of accounts whose code holds the stored units.
///
/// Every operation takes the state lock for its whole duration and stages
/// its changes before committing them in one batch, so operations are
/// serialized and either fully applied or not at all.
pub struct Ledger<S: StateBackend> {
    state: RwLock<S>,
    max_code_size: usize,
}

impl Ledger<MemoryState> {
    /// Volatile ledger
    pub fn in_memory(max_code_size: usize) -> Self {
        Self::new(MemoryState::new(), max_code_size)
    }
}

impl Ledger<StateDb> {
    /// Open (or create) a RocksDB-backed ledger at `path`
    pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        let db = Database::new(path.as_ref());
        db.open()?;
        info!(path = %path.as_ref().display(), "opened ledger database");
        Ok(Self::new(StateDb::new(db), config.max_code_size))
    }
}

impl<S: StateBackend> Ledger<S> {
    /// Wrap a state backend
    pub fn new(state: S, max_code_size: usize) -> Self {
        Self {
            state: RwLock::new(state),
            max_code_size,
        }
    }

    /// Nonce the next deployment by `sender` will use
    pub fn next_nonce(&self, sender: &Address) -> Result<u64> {
        let state = self.state.read();
        Ok(state
            .get_account(sender)?
            .map(|a| a.nonce)
            .unwrap_or(CONTRACT_START_NONCE))
    }

    /// Creator recorded for `address`, if an account exists there
    pub fn creator_of(&self, address: &Address) -> Result<Option<Address>> {
        let state = self.state.read();
        Ok(state.get_account(address)?.map(|a| a.creator))
    }

    /// Deploy `code` from `sender` at the CREATE address for its current nonce
    pub fn create(&self, sender: &Address, code: Vec<u8>) -> Result<Address> {
        if code.len() > self.max_code_size {
            return Err(BytecodeStorageError::Write(WriteFailure::CodeSizeExceeded {
                size: code.len(),
                max: self.max_code_size,
            }));
        }

        let mut state = self.state.write();
        let mut staged = CachedState::new(&*state);

        let mut sender_account = staged.get_account(sender)?.unwrap_or(Account {
            nonce: CONTRACT_START_NONCE,
            ..Account::new()
        });
        let nonce = sender_account.nonce;
        let address = create_address(sender, nonce);

        if staged
            .get_account(&address)?
            .is_some_and(|existing| existing.is_occupied())
        {
            return Err(BytecodeStorageError::Write(WriteFailure::AddressCollision(address)));
        }

        sender_account.nonce = nonce
            .checked_add(1)
            .ok_or(StateError::NonceOverflow(*sender))?;
        staged.set_account(*sender, sender_account)?;
        staged.set_account(address, Account::with_code(*sender, &code))?;
        let code_len = code.len();
        staged.set_code(address, code)?;

        let changes = staged.into_cache();
        state.commit(changes)?;

        debug!(%sender, %address, nonce, code_len, "deployed unit");
        Ok(address)
    }

    /// Code at `address`; empty when nothing is deployed
    pub fn code_at(&self, address: &Address) -> Result<Vec<u8>> {
        let state = self.state.read();
        Ok(state.code_at(address)?)
    }

    /// Remove the code at `address`. Only its creator may do so; the account
    /// stays behind as a tombstone so the address is never reallocated.
    pub fn destroy(&self, address: &Address, caller: &Address) -> Result<()> {
        let mut state = self.state.write();

        let account = match state.get_account(address)? {
            Some(account) if account.has_code() => account,
            _ => return Err(BytecodeStorageError::delete(*address, DeleteFailure::NoCode)),
        };
        if account.creator != *caller {
            return Err(BytecodeStorageError::delete(
                *address,
                DeleteFailure::NotCreator { caller: *caller },
            ));
        }

        let mut staged = CachedState::new(&*state);
        staged.set_account(
            *address,
            Account {
                code_hash: EMPTY_CODE_HASH,
                destroyed: true,
                ..account
            },
        )?;
        staged.delete_code(address)?;

        let changes = staged.into_cache();
        state.commit(changes)?;

        debug!(%address, %caller, "destroyed unit");
        Ok(())
    }

    /// Send `data` to the unit at `address`. Stored units are inert: the call
    /// returns no output and never changes state, whatever the data.
    pub fn call(&self, address: &Address, caller: &Address, data: &[u8]) -> Result<Vec<u8>> {
        let state = self.state.read();
        let has_code = state.get_account(address)?.is_some_and(|a| a.has_code());
        trace!(%address, %caller, data_len = data.len(), has_code, "inert call");
        Ok(Vec::new())
    }
}

impl<S: StateBackend> UnitStore for Ledger<S> {
    fn deploy(&self, creator: &Address, code: Vec<u8>) -> Result<Address> {
        self.create(creator, code)
    }

    fn code(&self, address: &Address) -> Result<Vec<u8>> {
        self.code_at(address)
    }

    fn destroy(&self, address: &Address, caller: &Address) -> Result<()> {
        Ledger::destroy(self, address, caller)
    }

    fn max_code_size(&self) -> usize {
        self.max_code_size
    }
}
