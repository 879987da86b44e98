//! Sled-backed registry snapshots

use std::path::Path;
use thiserror::Error;

use crate::registry::StakeRegistry;

const REGISTRY_KEY: &[u8] = b"staking:registry";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Io(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Codec(#[from] bincode::Error),
}

#[derive(Debug)]
pub struct StakingStore {
    db: sled::Db,
}

impl StakingStore {
    /// Open or create the store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(StakingStore { db })
    }

    /// Persist the full registry snapshot and flush it to disk.
    pub fn save(&self, registry: &StakeRegistry) -> Result<(), StoreError> {
        let data = bincode::serialize(registry)?;
        self.db.insert(REGISTRY_KEY, data)?;
        self.db.flush()?;
        Ok(())
    }

    /// Load the last saved snapshot, if any.
    pub fn load(&self) -> Result<Option<StakeRegistry>, StoreError> {
        match self.db.get(REGISTRY_KEY)? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }
}
