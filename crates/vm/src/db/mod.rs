use crate::errors::{DatabaseError, StorageUpdates};
use ethereum_types::U256;
use rustc_hash::FxHashMap;

pub mod staged;

/// Durable word-keyed store owned by the hosting account.
///
/// Calls never write to it directly: their writes are staged in a
/// [`StagedStorage`](staged::StagedStorage) and handed over through
/// [`apply_storage_updates`](PersistentStorage::apply_storage_updates) only when the call
/// succeeds.
pub trait PersistentStorage {
    /// Value stored at `key`. Slots that were never written read as zero.
    fn get_storage_value(&self, key: U256) -> Result<U256, DatabaseError>;
    /// Applies every update atomically.
    fn apply_storage_updates(&mut self, updates: &StorageUpdates) -> Result<(), DatabaseError>;
}

/// Storage kept in process memory, the default backing for a deployed contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryStorage {
    slots: FxHashMap<U256, U256>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots holding a nonzero value.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl PersistentStorage for InMemoryStorage {
    fn get_storage_value(&self, key: U256) -> Result<U256, DatabaseError> {
        Ok(self.slots.get(&key).copied().unwrap_or_default())
    }

    fn apply_storage_updates(&mut self, updates: &StorageUpdates) -> Result<(), DatabaseError> {
        for (key, value) in updates {
            if value.is_zero() {
                self.slots.remove(key);
            } else {
                self.slots.insert(*key, *value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_slots_read_as_zero() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get_storage_value(U256::zero()), Ok(U256::zero()));
        assert_eq!(storage.get_storage_value(U256::MAX), Ok(U256::zero()));
    }

    #[test]
    fn zero_writes_clear_the_slot() {
        let mut storage = InMemoryStorage::new();
        storage
            .apply_storage_updates(&StorageUpdates::from([(U256::one(), U256::from(7))]))
            .unwrap();
        assert_eq!(storage.len(), 1);

        storage
            .apply_storage_updates(&StorageUpdates::from([(U256::one(), U256::zero())]))
            .unwrap();
        assert!(storage.is_empty());
        assert_eq!(storage.get_storage_value(U256::one()), Ok(U256::zero()));
    }
}
