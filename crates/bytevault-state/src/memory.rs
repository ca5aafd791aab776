//! In-memory state backend

use crate::account::{Account, StateBackend, StateReader};
use crate::error::StateResult;
use crate::state::StateCache;
use bytevault_primitives::Address;
use std::collections::HashMap;

/// Volatile state, used by tests and ephemeral ledgers
#[derive(Default, Debug)]
pub struct MemoryState {
    accounts: HashMap<Address, Account>,
    code: HashMap<Address, Vec<u8>>,
}

impl MemoryState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts ever touched
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl StateReader for MemoryState {
    fn get_account(&self, address: &Address) -> StateResult<Option<Account>> {
        Ok(self.accounts.get(address).cloned())
    }

    fn get_code(&self, address: &Address) -> StateResult<Option<Vec<u8>>> {
        Ok(self.code.get(address).cloned())
    }
}

impl StateBackend for MemoryState {
    fn commit(&mut self, changes: StateCache) -> StateResult<()> {
        self.accounts.extend(changes.accounts);
        for (address, code) in changes.code {
            match code {
                Some(code) => {
                    self.code.insert(address, code);
                }
                None => {
                    self.code.remove(&address);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::StateWriter;

    #[test]
    fn test_memory_state_commit() {
        let mut state = MemoryState::new();
        let addr = Address::from_bytes([0x33; 20]);

        let mut changes = StateCache::new();
        changes
            .set_account(addr, Account::with_code(Address::ZERO, &[0x00]))
            .unwrap();
        changes.set_code(addr, vec![0x00]).unwrap();
        state.commit(changes).unwrap();

        assert_eq!(state.account_count(), 1);
        assert_eq!(state.code_at(&addr).unwrap(), vec![0x00]);

        let mut changes = StateCache::new();
        changes.delete_code(&addr).unwrap();
        state.commit(changes).unwrap();
        assert_eq!(state.get_code(&addr).unwrap(), None);
    }

    #[test]
    fn test_memory_state_empty_commit_is_noop() {
        let mut state = MemoryState::new();
        state.commit(StateCache::new()).unwrap();
        assert_eq!(state.account_count(), 0);
    }
}
