//! Durable snapshot storage behind a trait.

use std::sync::{Mutex, MutexGuard};

use rustc_hash::FxHashMap;

use crate::core::StoreError;
use crate::rules::RoundId;

/// Where Round snapshots live between operations.
///
/// The actor saves the snapshot of every successful operation before the
/// new state becomes visible; a failing `save` rejects the operation.
pub trait RoundStore: Send + Sync + 'static {
    fn save(&self, round: RoundId, snapshot: &[u8]) -> Result<(), StoreError>;

    /// The latest snapshot, or `None` if the Round was never saved.
    fn load(&self, round: RoundId) -> Result<Option<Vec<u8>>, StoreError>;
}

/// In-process store, one snapshot per Round.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rounds: Mutex<FxHashMap<RoundId, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn rounds(&self) -> Result<MutexGuard<'_, FxHashMap<RoundId, Vec<u8>>>, StoreError> {
        self.rounds
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    /// Number of Rounds stored.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.rounds()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.rounds()?.is_empty())
    }

    /// Overwrite a snapshot directly, bypassing the actor.
    pub fn put(&self, round: RoundId, snapshot: Vec<u8>) -> Result<(), StoreError> {
        self.save(round, &snapshot)
    }
}

impl RoundStore for MemoryStore {
    fn save(&self, round: RoundId, snapshot: &[u8]) -> Result<(), StoreError> {
        self.rounds()?.insert(round, snapshot.to_vec());
        Ok(())
    }

    fn load(&self, round: RoundId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.rounds()?.get(&round).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_save_overwrites() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.load(id).unwrap(), None);

        store.save(id, &[1, 2]).unwrap();
        store.save(id, &[3]).unwrap();
        assert_eq!(store.load(id).unwrap(), Some(vec![3]));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_poisoned_lock_reports_unavailable() {
        let store = MemoryStore::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _held = store.rounds.lock().unwrap();
            panic!("writer died holding the lock");
        }));

        assert!(matches!(store.len(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.save(Uuid::new_v4(), &[1]), Err(StoreError::Unavailable(_))));
    }
}
