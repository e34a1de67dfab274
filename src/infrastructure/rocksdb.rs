use crate::domain::machine::Machine;
use crate::domain::ports::MachineStore;
use crate::error::{Result, VendingError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the machine snapshot.
pub const CF_MACHINE: &str = "machine";
/// Key of the single snapshot document.
pub const SNAPSHOT_KEY: &[u8] = b"snapshot";

/// A persistent store implementation using RocksDB.
///
/// The whole machine is one JSON value under [`SNAPSHOT_KEY`], so a save is a
/// single atomic `put`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "machine" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_machine = ColumnFamilyDescriptor::new(CF_MACHINE, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_machine])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn put(&self, machine: &Machine) -> Result<()> {
        let cf = self.db.cf_handle(CF_MACHINE).ok_or_else(|| {
            VendingError::Persistence("Machine column family not found".to_string())
        })?;
        let value = serde_json::to_vec(machine)?;
        self.db.put_cf(&cf, SNAPSHOT_KEY, value)?;
        Ok(())
    }
}

#[async_trait]
impl MachineStore for RocksDBStore {
    async fn load(&self) -> Result<Machine> {
        let cf = self.db.cf_handle(CF_MACHINE).ok_or_else(|| {
            VendingError::Persistence("Machine column family not found".to_string())
        })?;

        match self.db.get_cf(&cf, SNAPSHOT_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                VendingError::Persistence(format!("Deserialization error: {}", e))
            }),
            None => {
                let machine = Machine::seeded()?;
                self.put(&machine)?;
                Ok(machine)
            }
        }
    }

    async fn save(&self, machine: &Machine) -> Result<()> {
        self.put(machine)
    }
}
