//! Per-project script slots backed by stored units

use crate::config::StoreConfig;
use crate::error::{BytecodeStorageError, Result};
use crate::reader::BytecodeReader;
use crate::writer::BytecodeWriter;
use bytevault_primitives::Address;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Ordered script pointers per project.
///
/// Units are immutable, so updating a slot writes a new unit and repoints
/// the slot. The replaced unit is purged when `purge_replaced` is set. A
/// failed purge leaves the slots as they were.
pub struct ScriptSlots {
    writer: BytecodeWriter,
    reader: BytecodeReader,
    projects: HashMap<u64, Vec<Address>>,
    purge_replaced: bool,
    compress_scripts: bool,
}

impl ScriptSlots {
    /// Slots writing through `writer` and reading through `reader`
    pub fn new(writer: BytecodeWriter, reader: BytecodeReader) -> Self {
        Self {
            writer,
            reader,
            projects: HashMap::new(),
            purge_replaced: true,
            compress_scripts: false,
        }
    }

    /// Slots honouring the script settings of `config`
    pub fn from_config(writer: BytecodeWriter, reader: BytecodeReader, config: &StoreConfig) -> Self {
        Self {
            purge_replaced: config.purge_replaced,
            compress_scripts: config.compress_scripts,
            ..Self::new(writer, reader)
        }
    }

    fn store(&self, script: &str) -> Result<Address> {
        if self.compress_scripts {
            self.writer.write_compressed(script)
        } else {
            self.writer.write_string(script)
        }
    }

    fn retire(&self, unit: &Address) -> Result<()> {
        if self.purge_replaced {
            self.writer.purge(unit)?;
        }
        Ok(())
    }

    fn out_of_range(&self, project: u64, index: usize) -> BytecodeStorageError {
        BytecodeStorageError::ScriptIndexOutOfRange {
            project,
            index,
            count: self.script_count(project),
        }
    }

    /// Append a script and return its unit address
    pub fn add_script(&mut self, project: u64, script: &str) -> Result<Address> {
        let unit = self.store(script)?;
        let slots = self.projects.entry(project).or_default();
        slots.push(unit);
        debug!(project, index = slots.len() - 1, %unit, "added script");
        Ok(unit)
    }

    /// Replace the script at `index`.
    ///
    /// The slot is only repointed once the previous unit has been retired. If
    /// retiring fails, the freshly written unit is purged again and the slot
    /// keeps its old pointer.
    pub fn update_script(&mut self, project: u64, index: usize, script: &str) -> Result<Address> {
        let previous = self.script_pointer(project, index)?;
        let unit = self.store(script)?;
        if let Err(err) = self.retire(&previous) {
            if let Err(undo) = self.writer.purge(&unit) {
                warn!(project, index, %unit, error = %undo, "could not purge orphaned script unit");
            }
            return Err(err);
        }
        if let Some(slot) = self.projects.get_mut(&project).and_then(|s| s.get_mut(index)) {
            *slot = unit;
        }
        debug!(project, index, %previous, %unit, "updated script");
        Ok(unit)
    }

    /// Drop the last script of `project`. The slot is only removed once its
    /// unit has been retired.
    pub fn remove_last_script(&mut self, project: u64) -> Result<Address> {
        let last = self
            .projects
            .get(&project)
            .and_then(|slots| slots.last())
            .copied()
            .ok_or(BytecodeStorageError::ScriptIndexOutOfRange {
                project,
                index: 0,
                count: 0,
            })?;
        self.retire(&last)?;
        if let Some(slots) = self.projects.get_mut(&project) {
            slots.pop();
        }
        debug!(project, removed = %last, "removed last script");
        Ok(last)
    }

    /// Unit address behind slot `index`
    pub fn script_pointer(&self, project: u64, index: usize) -> Result<Address> {
        self.projects
            .get(&project)
            .and_then(|slots| slots.get(index))
            .copied()
            .ok_or_else(|| self.out_of_range(project, index))
    }

    /// Number of scripts in `project`
    pub fn script_count(&self, project: u64) -> usize {
        self.projects.get(&project).map_or(0, Vec::len)
    }

    /// All scripts of `project` joined in slot order
    pub fn script(&self, project: u64) -> Result<String> {
        let mut joined = String::new();
        for unit in self.projects.get(&project).into_iter().flatten() {
            joined.push_str(&self.reader.read_content(unit)?);
        }
        if joined.is_empty() {
            warn!(project, "project has no scripts");
        }
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeleteFailure, ReadFailure};
    use crate::ledger::{Ledger, CONTRACT_START_NONCE, MAX_CODE_SIZE};
    use crate::store::UnitStore;
    use bytevault_crypto::create_address;
    use std::sync::Arc;

    fn slots(config: &StoreConfig) -> (Arc<dyn UnitStore>, ScriptSlots) {
        let store: Arc<dyn UnitStore> = Arc::new(Ledger::in_memory(MAX_CODE_SIZE));
        let writer = BytecodeWriter::from_config(store.clone(), Address::from_bytes([0xa1; 20]), config);
        let reader = BytecodeReader::new(store.clone());
        (store, ScriptSlots::from_config(writer, reader, config))
    }

    // ==================== Slots ====================

    #[test]
    fn test_add_and_concatenate() {
        let (_store, mut slots) = slots(&StoreConfig::default());
        slots.add_script(3, "let a = 1;").unwrap();
        slots.add_script(3, "draw(a);").unwrap();

        assert_eq!(slots.script_count(3), 2);
        assert_eq!(slots.script_count(4), 0);
        assert_eq!(slots.script(3).unwrap(), "let a = 1;draw(a);");
        assert_eq!(slots.script(4).unwrap(), "");
    }

    #[test]
    fn test_update_repoints_and_purges_previous() {
        let (store, mut slots) = slots(&StoreConfig::default());
        let first = slots.add_script(1, "old").unwrap();
        let second = slots.update_script(1, 0, "new").unwrap();

        assert_ne!(first, second);
        assert_eq!(slots.script_pointer(1, 0).unwrap(), second);
        assert_eq!(slots.script(1).unwrap(), "new");
        assert!(store.code(&first).unwrap().is_empty());
    }

    #[test]
    fn test_update_keeps_previous_when_not_purging() {
        let config = StoreConfig {
            purge_replaced: false,
            ..StoreConfig::default()
        };
        let (store, mut slots) = slots(&config);
        let first = slots.add_script(1, "old").unwrap();
        slots.update_script(1, 0, "new").unwrap();

        assert!(!store.code(&first).unwrap().is_empty());
        let reader = BytecodeReader::new(store);
        assert_eq!(reader.read_string(&first).unwrap(), "old");
    }

    #[test]
    fn test_remove_last_script() {
        let (store, mut slots) = slots(&StoreConfig::default());
        slots.add_script(9, "a").unwrap();
        let last = slots.add_script(9, "b").unwrap();

        assert_eq!(slots.remove_last_script(9).unwrap(), last);
        assert_eq!(slots.script_count(9), 1);
        assert_eq!(slots.script(9).unwrap(), "a");

        let reader = BytecodeReader::new(store);
        assert!(matches!(
            reader.read_payload(&last),
            Err(BytecodeStorageError::Read { reason: ReadFailure::NoCode, .. })
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let (_store, mut slots) = slots(&StoreConfig::default());
        slots.add_script(2, "only").unwrap();

        assert!(matches!(
            slots.script_pointer(2, 1),
            Err(BytecodeStorageError::ScriptIndexOutOfRange { project: 2, index: 1, count: 1 })
        ));
        assert!(matches!(
            slots.update_script(2, 5, "x"),
            Err(BytecodeStorageError::ScriptIndexOutOfRange { index: 5, .. })
        ));
        assert!(matches!(
            slots.remove_last_script(7),
            Err(BytecodeStorageError::ScriptIndexOutOfRange { project: 7, count: 0, .. })
        ));
    }

    #[test]
    fn test_failed_retire_leaves_slots_unchanged() {
        let config = StoreConfig::default();
        let store: Arc<dyn UnitStore> = Arc::new(Ledger::in_memory(MAX_CODE_SIZE));
        let writer = BytecodeWriter::from_config(store.clone(), Address::from_bytes([0xa1; 20]), &config);
        let side_writer = writer.clone();
        let mut slots = ScriptSlots::from_config(writer, BytecodeReader::new(store.clone()), &config);

        slots.add_script(1, "keep").unwrap();
        let first = slots.add_script(1, "old").unwrap();
        // Purged behind the slots' back, so retiring it again must fail
        side_writer.purge(&first).unwrap();

        let err = slots.update_script(1, 1, "new").unwrap_err();
        assert!(matches!(
            err,
            BytecodeStorageError::Delete { reason: DeleteFailure::NoCode, .. }
        ));
        assert_eq!(slots.script_pointer(1, 1).unwrap(), first);
        assert_eq!(slots.script_count(1), 2);

        // The unit written for the rejected update (third deployment) does not linger
        let orphan = create_address(&side_writer.address(), CONTRACT_START_NONCE + 2);
        assert!(store.code(&orphan).unwrap().is_empty());

        let err = slots.remove_last_script(1).unwrap_err();
        assert!(matches!(
            err,
            BytecodeStorageError::Delete { reason: DeleteFailure::NoCode, .. }
        ));
        assert_eq!(slots.script_count(1), 2);
        assert_eq!(slots.script_pointer(1, 1).unwrap(), first);
    }

    #[test]
    fn test_compressed_scripts() {
        let config = StoreConfig {
            compress_scripts: true,
            ..StoreConfig::default()
        };
        let (store, mut slots) = slots(&config);
        let unit = slots.add_script(5, "function setup() { createCanvas(100, 100); }").unwrap();
        slots.add_script(5, "\nsetup();").unwrap();

        let reader = BytecodeReader::new(store);
        assert!(reader.is_compressed_of(&unit).unwrap());
        assert_eq!(
            slots.script(5).unwrap(),
            "function setup() { createCanvas(100, 100); }\nsetup();"
        );
    }
}
