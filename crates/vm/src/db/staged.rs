use super::PersistentStorage;
use crate::errors::{DatabaseError, StorageUpdates};
use ethereum_types::U256;
use std::fmt;
use tracing::debug;

/// Per-call overlay on top of the durable store.
///
/// Reads see the call's own writes first and fall through to the store otherwise. Nothing
/// reaches the store until [`commit`](StagedStorage::commit); dropping the overlay (or calling
/// [`discard`](StagedStorage::discard)) forgets every staged write.
pub struct StagedStorage<'a> {
    store: &'a mut dyn PersistentStorage,
    writes: StorageUpdates,
}

impl fmt::Debug for StagedStorage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedStorage")
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}

impl<'a> StagedStorage<'a> {
    pub fn new(store: &'a mut dyn PersistentStorage) -> Self {
        Self {
            store,
            writes: StorageUpdates::new(),
        }
    }

    pub fn get(&self, key: U256) -> Result<U256, DatabaseError> {
        match self.writes.get(&key) {
            Some(value) => Ok(*value),
            None => self.store.get_storage_value(key),
        }
    }

    pub fn set(&mut self, key: U256, value: U256) {
        self.writes.insert(key, value);
    }

    /// Applies the staged writes to the durable store and returns them.
    pub fn commit(&mut self) -> Result<StorageUpdates, DatabaseError> {
        let writes = std::mem::take(&mut self.writes);
        if !writes.is_empty() {
            self.store.apply_storage_updates(&writes)?;
            debug!(slots = writes.len(), "Committed storage updates");
        }
        Ok(writes)
    }

    pub fn discard(&mut self) {
        if !self.writes.is_empty() {
            debug!(slots = self.writes.len(), "Discarded staged storage updates");
        }
        self.writes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStorage;

    #[test]
    fn staged_writes_are_visible_before_commit() {
        let mut store = InMemoryStorage::new();
        let mut staged = StagedStorage::new(&mut store);

        staged.set(U256::zero(), U256::from(42));
        assert_eq!(staged.get(U256::zero()), Ok(U256::from(42)));
        assert_eq!(staged.get(U256::one()), Ok(U256::zero()));

        let committed = staged.commit().unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(store.get_storage_value(U256::zero()), Ok(U256::from(42)));
    }

    #[test]
    fn discarded_writes_never_reach_the_store() {
        let mut store = InMemoryStorage::new();
        store
            .apply_storage_updates(&StorageUpdates::from([(U256::zero(), U256::from(5))]))
            .unwrap();

        let mut staged = StagedStorage::new(&mut store);
        staged.set(U256::zero(), U256::from(6));
        staged.discard();
        assert_eq!(staged.get(U256::zero()), Ok(U256::from(5)));
        drop(staged);

        assert_eq!(store.get_storage_value(U256::zero()), Ok(U256::from(5)));
    }
}
