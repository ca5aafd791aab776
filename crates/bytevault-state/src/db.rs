//! RocksDB wrapper

use crate::error::{StateError, StateResult};
use parking_lot::RwLock;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options, WriteBatch,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Column family names
pub mod cf {
    /// Account records
    pub const ACCOUNTS: &str = "accounts";
    /// Deployed code, keyed by unit address
    pub const CODE: &str = "code";
    /// Metadata
    pub const META: &str = "meta";
}

/// All column family names
pub const ALL_CFS: &[&str] = &[cf::ACCOUNTS, cf::CODE, cf::META];

type RocksDB = DBWithThreadMode<MultiThreaded>;

/// Database configuration
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Create database if missing
    pub create_if_missing: bool,
    /// Maximum number of open files
    pub max_open_files: i32,
    /// Write buffer size
    pub write_buffer_size: usize,
    /// Maximum write buffers
    pub max_write_buffer_number: i32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            max_open_files: 256,
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            max_write_buffer_number: 2,
        }
    }
}

/// RocksDB wrapper with column family support
pub struct Database {
    db: Arc<RwLock<Option<RocksDB>>>,
    path: PathBuf,
}

impl Database {
    /// Create a new database instance (not yet opened)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            db: Arc::new(RwLock::new(None)),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Open the database with default config
    pub fn open(&self) -> StateResult<()> {
        self.open_with_config(DbConfig::default())
    }

    /// Open the database with custom config
    pub fn open_with_config(&self, config: DbConfig) -> StateResult<()> {
        let mut db_guard = self.db.write();
        if db_guard.is_some() {
            return Err(StateError::AlreadyOpen);
        }

        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(config.max_open_files);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = RocksDB::open_cf_descriptors(&opts, &self.path, cf_descriptors)?;
        *db_guard = Some(db);
        Ok(())
    }

    /// Close the database
    pub fn close(&self) {
        let mut db_guard = self.db.write();
        *db_guard = None;
    }

    /// Check if database is open
    pub fn is_open(&self) -> bool {
        self.db.read().is_some()
    }

    /// Get a value from a column family
    pub fn get(&self, cf_name: &str, key: &[u8]) -> StateResult<Option<Vec<u8>>> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StateError::NotOpen)?;
        let cf = Self::get_cf(db, cf_name)?;
        Ok(db.get_cf(&cf, key)?)
    }

    /// Put a value to a column family
    pub fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> StateResult<()> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StateError::NotOpen)?;
        let cf = Self::get_cf(db, cf_name)?;
        db.put_cf(&cf, key, value)?;
        Ok(())
    }

    /// Create a write batch
    pub fn batch(&self) -> WriteBatchWrapper {
        WriteBatchWrapper::new()
    }

    /// Execute a write batch atomically
    pub fn write_batch(&self, batch: WriteBatchWrapper) -> StateResult<()> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StateError::NotOpen)?;

        let mut rocks_batch = WriteBatch::default();
        for op in batch.operations {
            match op {
                BatchOp::Put { cf_name, key, value } => {
                    let cf = Self::get_cf(db, cf_name)?;
                    rocks_batch.put_cf(&cf, &key, &value);
                }
                BatchOp::Delete { cf_name, key } => {
                    let cf = Self::get_cf(db, cf_name)?;
                    rocks_batch.delete_cf(&cf, &key);
                }
            }
        }

        db.write(rocks_batch)?;
        Ok(())
    }

    fn get_cf<'a>(db: &'a RocksDB, name: &str) -> StateResult<Arc<BoundColumnFamily<'a>>> {
        db.cf_handle(name)
            .ok_or_else(|| StateError::InvalidColumnFamily(name.to_string()))
    }

    /// Get database path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            path: self.path.clone(),
        }
    }
}

enum BatchOp {
    Put {
        cf_name: &'static str,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Delete {
        cf_name: &'static str,
        key: Vec<u8>,
    },
}

/// Write batch wrapper
#[derive(Default)]
pub struct WriteBatchWrapper {
    operations: Vec<BatchOp>,
}

impl WriteBatchWrapper {
    /// Create a new write batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a put operation
    pub fn put(&mut self, cf_name: &'static str, key: &[u8], value: &[u8]) {
        self.operations.push(BatchOp::Put {
            cf_name,
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    /// Add a delete operation
    pub fn delete(&mut self, cf_name: &'static str, key: &[u8]) {
        self.operations.push(BatchOp::Delete {
            cf_name,
            key: key.to_vec(),
        });
    }

    /// Get number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if batch is empty
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_close() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path());

        assert!(!db.is_open());
        db.open().unwrap();
        assert!(db.is_open());
        assert!(matches!(db.open(), Err(StateError::AlreadyOpen)));
        db.close();
        assert!(!db.is_open());
    }

    #[test]
    fn test_not_open_error() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path());
        assert!(matches!(db.get(cf::ACCOUNTS, b"key"), Err(StateError::NotOpen)));
        assert!(matches!(db.put(cf::ACCOUNTS, b"k", b"v"), Err(StateError::NotOpen)));
        assert!(matches!(db.write_batch(db.batch()), Err(StateError::NotOpen)));
    }

    #[test]
    fn test_write_batch_put_and_delete() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path());
        db.open().unwrap();

        db.put(cf::CODE, b"unit1", b"code1").unwrap();

        let mut batch = db.batch();
        batch.delete(cf::CODE, b"unit1");
        batch.put(cf::CODE, b"unit2", b"code2");
        batch.put(cf::ACCOUNTS, b"unit2", b"acct2");
        assert_eq!(batch.len(), 3);
        db.write_batch(batch).unwrap();

        assert!(db.get(cf::CODE, b"unit1").unwrap().is_none());
        assert_eq!(db.get(cf::CODE, b"unit2").unwrap(), Some(b"code2".to_vec()));
        assert_eq!(db.get(cf::ACCOUNTS, b"unit2").unwrap(), Some(b"acct2".to_vec()));
    }

    #[test]
    fn test_column_family_isolation() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path());
        db.open().unwrap();

        for name in ALL_CFS {
            db.put(name, b"same_key", name.as_bytes()).unwrap();
        }
        for name in ALL_CFS {
            assert_eq!(db.get(name, b"same_key").unwrap(), Some(name.as_bytes().to_vec()));
        }
    }

    #[test]
    fn test_database_clone_shares_handle() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path());
        db.open().unwrap();

        let clone = db.clone();
        db.put(cf::META, b"k", b"v").unwrap();
        assert_eq!(clone.get(cf::META, b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(clone.path(), dir.path());
    }

    #[test]
    fn test_db_config_default() {
        let config = DbConfig::default();
        assert!(config.create_if_missing);
        assert_eq!(config.max_open_files, 256);
    }
}
