//! Registry of live Rounds, opened fresh or resumed from a store.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::core::{EngineResult, StoreError};
use crate::rules::{RoundEngine, RoundId, ScoringStrategy};

use super::actor::RoundActor;
use super::handle::RoundHandle;
use super::store::RoundStore;

/// Registry of running Rounds of one game, addressed by id.
///
/// Rounds share nothing but the store; each runs on its own task.
pub struct Lobby<S: ScoringStrategy> {
    store: Arc<dyn RoundStore>,
    rounds: RwLock<FxHashMap<RoundId, RoundHandle<S>>>,
}

impl<S: ScoringStrategy> Lobby<S> {
    pub fn new(store: Arc<dyn RoundStore>) -> Self {
        Self {
            store,
            rounds: RwLock::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn RoundStore> {
        &self.store
    }

    /// Persist a freshly built Round and spawn its actor.
    pub async fn open(&self, round: RoundEngine<S>) -> EngineResult<RoundHandle<S>> {
        let id = round.id();
        self.store.save(id, &round.snapshot()?)?;

        let handle = RoundActor::spawn(round, Arc::clone(&self.store));
        self.rounds.write().await.insert(id, handle.clone());
        tracing::info!(round = %id, "round opened");
        Ok(handle)
    }

    pub async fn get(&self, id: RoundId) -> Option<RoundHandle<S>> {
        self.rounds.read().await.get(&id).cloned()
    }

    /// The running handle, or a new actor restored from the store.
    ///
    /// A snapshot that fails its integrity checks comes back frozen.
    pub async fn resume(&self, id: RoundId) -> EngineResult<RoundHandle<S>> {
        let mut rounds = self.rounds.write().await;
        if let Some(handle) = rounds.get(&id) {
            return Ok(handle.clone());
        }

        let bytes = self.store.load(id)?.ok_or(StoreError::Missing(id))?;
        let round = RoundEngine::<S>::restore(&bytes)?;
        if let Some(reason) = round.frozen() {
            tracing::warn!(round = %id, reason, "resumed a frozen round");
        }
        let handle = RoundActor::spawn(round, Arc::clone(&self.store));
        rounds.insert(id, handle.clone());
        tracing::info!(round = %id, "round resumed from store");
        Ok(handle)
    }

    /// Forget a Round. Its actor stops once every other handle is dropped.
    pub async fn close(&self, id: RoundId) -> bool {
        self.rounds.write().await.remove(&id).is_some()
    }

    pub async fn ids(&self) -> Vec<RoundId> {
        self.rounds.read().await.keys().copied().collect()
    }
}
