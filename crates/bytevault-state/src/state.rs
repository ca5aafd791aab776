//! Change sets and the RocksDB-backed state

use crate::account::{Account, StateBackend, StateReader, StateWriter};
use crate::db::{cf, Database};
use crate::error::{StateError, StateResult};
use bytevault_primitives::Address;
use std::collections::HashMap;
use tracing::debug;

/// State database backed by RocksDB
pub struct StateDb {
    db: Database,
}

impl StateDb {
    /// Create a new state database over an opened [`Database`]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the underlying database
    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl StateReader for StateDb {
    fn get_account(&self, address: &Address) -> StateResult<Option<Account>> {
        match self.db.get(cf::ACCOUNTS, address.as_bytes())? {
            Some(bytes) => Account::from_bytes(&bytes)
                .map(Some)
                .ok_or_else(|| StateError::Deserialization(format!("account {}", address))),
            None => Ok(None),
        }
    }

    fn get_code(&self, address: &Address) -> StateResult<Option<Vec<u8>>> {
        self.db.get(cf::CODE, address.as_bytes())
    }
}

impl StateBackend for StateDb {
    fn commit(&mut self, changes: StateCache) -> StateResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut batch = self.db.batch();

        for (address, account) in &changes.accounts {
            batch.put(cf::ACCOUNTS, address.as_bytes(), &account.to_bytes());
        }

        for (address, code) in &changes.code {
            match code {
                Some(code) => batch.put(cf::CODE, address.as_bytes(), code),
                None => batch.delete(cf::CODE, address.as_bytes()),
            }
        }

        debug!(
            accounts = changes.accounts.len(),
            code = changes.code.len(),
            "committing state batch"
        );
        self.db.write_batch(batch)
    }
}

/// Change set staged by one operation
#[derive(Default, Debug)]
pub struct StateCache {
    /// Changed accounts
    pub(crate) accounts: HashMap<Address, Account>,
    /// Changed code (None = deleted)
    pub(crate) code: HashMap<Address, Option<Vec<u8>>>,
}

impl StateCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of cached account changes
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Get number of cached code changes
    pub fn code_count(&self) -> usize {
        self.code.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.code.is_empty()
    }
}

impl StateReader for StateCache {
    fn get_account(&self, address: &Address) -> StateResult<Option<Account>> {
        Ok(self.accounts.get(address).cloned())
    }

    fn get_code(&self, address: &Address) -> StateResult<Option<Vec<u8>>> {
        Ok(self.code.get(address).cloned().flatten())
    }
}

impl StateWriter for StateCache {
    fn set_account(&mut self, address: Address, account: Account) -> StateResult<()> {
        self.accounts.insert(address, account);
        Ok(())
    }

    fn set_code(&mut self, address: Address, code: Vec<u8>) -> StateResult<()> {
        self.code.insert(address, Some(code));
        Ok(())
    }

    fn delete_code(&mut self, address: &Address) -> StateResult<()> {
        self.code.insert(*address, None);
        Ok(())
    }
}

/// Layered state with fallback to underlying storage
pub struct CachedState<'a> {
    cache: StateCache,
    underlying: &'a dyn StateReader,
}

impl<'a> CachedState<'a> {
    /// Create a new cached state layer
    pub fn new(underlying: &'a dyn StateReader) -> Self {
        Self {
            cache: StateCache::new(),
            underlying,
        }
    }

    /// Get the staged changes
    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Take ownership of the staged changes
    pub fn into_cache(self) -> StateCache {
        self.cache
    }
}

impl StateReader for CachedState<'_> {
    fn get_account(&self, address: &Address) -> StateResult<Option<Account>> {
        if let Some(cached) = self.cache.accounts.get(address) {
            return Ok(Some(cached.clone()));
        }
        self.underlying.get_account(address)
    }

    fn get_code(&self, address: &Address) -> StateResult<Option<Vec<u8>>> {
        if let Some(cached) = self.cache.code.get(address) {
            return Ok(cached.clone());
        }
        self.underlying.get_code(address)
    }
}

impl StateWriter for CachedState<'_> {
    fn set_account(&mut self, address: Address, account: Account) -> StateResult<()> {
        self.cache.set_account(address, account)
    }

    fn set_code(&mut self, address: Address, code: Vec<u8>) -> StateResult<()> {
        self.cache.set_code(address, code)
    }

    fn delete_code(&mut self, address: &Address) -> StateResult<()> {
        self.cache.delete_code(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryState;
    use tempfile::TempDir;

    fn open_state_db() -> (TempDir, StateDb) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path());
        db.open().unwrap();
        (dir, StateDb::new(db))
    }

    fn unit_account(code: &[u8]) -> Account {
        Account::with_code(Address::from_bytes([0x01; 20]), code)
    }

    // ==================== StateDb ====================

    #[test]
    fn test_state_db_commit_and_read() {
        let (_dir, mut state) = open_state_db();
        let addr = Address::from_bytes([0x42; 20]);
        let code = vec![0x00, 0xaa, 0xbb];

        assert!(state.get_account(&addr).unwrap().is_none());
        assert!(state.code_at(&addr).unwrap().is_empty());

        let mut changes = StateCache::new();
        changes.set_account(addr, unit_account(&code)).unwrap();
        changes.set_code(addr, code.clone()).unwrap();
        state.commit(changes).unwrap();

        assert_eq!(state.code_at(&addr).unwrap(), code);
        assert_eq!(state.get_nonce(&addr).unwrap(), 1);
    }

    #[test]
    fn test_state_db_delete_code() {
        let (_dir, mut state) = open_state_db();
        let addr = Address::from_bytes([0x42; 20]);

        let mut changes = StateCache::new();
        changes.set_account(addr, unit_account(&[0x01])).unwrap();
        changes.set_code(addr, vec![0x01]).unwrap();
        state.commit(changes).unwrap();

        let mut changes = StateCache::new();
        changes.delete_code(&addr).unwrap();
        state.commit(changes).unwrap();

        assert!(state.get_code(&addr).unwrap().is_none());
    }

    #[test]
    fn test_state_db_detects_corrupt_code() {
        let (_dir, mut state) = open_state_db();
        let addr = Address::from_bytes([0x42; 20]);

        let mut changes = StateCache::new();
        changes.set_account(addr, unit_account(&[0x01, 0x02])).unwrap();
        changes.set_code(addr, vec![0x01, 0x03]).unwrap();
        state.commit(changes).unwrap();

        assert!(matches!(state.code_at(&addr), Err(StateError::CorruptCode(a)) if a == addr));
    }

    #[test]
    fn test_state_db_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let addr = Address::from_bytes([0x07; 20]);
        {
            let db = Database::new(dir.path());
            db.open().unwrap();
            let mut state = StateDb::new(db);
            let mut changes = StateCache::new();
            changes.increment_nonce(&addr).unwrap();
            changes.increment_nonce(&addr).unwrap();
            state.commit(changes).unwrap();
            state.database().close();
        }
        let db = Database::new(dir.path());
        db.open().unwrap();
        let state = StateDb::new(db);
        assert_eq!(state.get_nonce(&addr).unwrap(), 2);
    }

    // ==================== StateCache / CachedState ====================

    #[test]
    fn test_state_cache_basic() {
        let mut cache = StateCache::new();
        assert!(cache.is_empty());

        let addr = Address::from_bytes([0x05; 20]);
        cache.set_code(addr, vec![0xfe]).unwrap();
        assert_eq!(cache.code_count(), 1);
        assert_eq!(cache.get_code(&addr).unwrap(), Some(vec![0xfe]));

        cache.delete_code(&addr).unwrap();
        assert_eq!(cache.get_code(&addr).unwrap(), None);
        assert_eq!(cache.code_count(), 1);
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_cached_state_layering() {
        let mut base = MemoryState::new();
        let addr = Address::from_bytes([0x09; 20]);
        let mut seed = StateCache::new();
        seed.set_account(addr, unit_account(&[0x01])).unwrap();
        seed.set_code(addr, vec![0x01]).unwrap();
        base.commit(seed).unwrap();

        let mut layered = CachedState::new(&base);
        assert_eq!(layered.code_at(&addr).unwrap(), vec![0x01]);

        // Deletion in the overlay hides the underlying code without touching it
        layered.delete_code(&addr).unwrap();
        assert_eq!(layered.get_code(&addr).unwrap(), None);
        assert_eq!(base.get_code(&addr).unwrap(), Some(vec![0x01]));

        let other = Address::from_bytes([0x0a; 20]);
        assert_eq!(layered.increment_nonce(&other).unwrap(), 1);
        assert_eq!(layered.increment_nonce(&other).unwrap(), 2);
        assert_eq!(base.get_nonce(&other).unwrap(), 0);

        let changes = layered.into_cache();
        assert_eq!(changes.account_count(), 1);
        assert_eq!(changes.code_count(), 1);
    }

    #[test]
    fn test_increment_nonce_overflow() {
        let mut cache = StateCache::new();
        let addr = Address::from_bytes([0x0b; 20]);
        let mut account = Account::new();
        account.nonce = u64::MAX;
        cache.set_account(addr, account).unwrap();
        assert!(matches!(
            cache.increment_nonce(&addr),
            Err(StateError::NonceOverflow(a)) if a == addr
        ));
    }
}
