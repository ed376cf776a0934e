//! Round-level configuration.
//!
//! Scoring constants live with each game (`games::guess::GuessConfig`,
//! `games::search::SearchConfig`). This module holds what every Round
//! shares: how turns resolve, the shared pool, and the RNG seed.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};

/// Who triggers `resolve` once every slot is locked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveMode {
    /// The operator calls `resolve`.
    #[default]
    Manual,
    /// The engine resolves in the same step that locks the last slot.
    Auto,
}

/// Shared Resource Pool parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Initial fund.
    pub initial: u64,
    /// Percentage of `initial` that can never be spent (0-100).
    pub floor_percent: u8,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial: 1_000,
            floor_percent: 20,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn new(initial: u64, floor_percent: u8) -> Self {
        Self {
            initial,
            floor_percent,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.floor_percent > 100 {
            return Err(EngineError::InvalidConfig(format!(
                "pool floor_percent {} exceeds 100",
                self.floor_percent
            )));
        }
        Ok(())
    }
}

/// Options shared by every Round regardless of game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundOptions {
    pub resolve: ResolveMode,
    pub pool: PoolConfig,
    pub seed: u64,
}

impl Default for RoundOptions {
    fn default() -> Self {
        Self {
            resolve: ResolveMode::Manual,
            pool: PoolConfig::default(),
            seed: 0,
        }
    }
}

impl RoundOptions {
    #[must_use]
    pub fn with_resolve(mut self, resolve: ResolveMode) -> Self {
        self.resolve = resolve;
        self
    }

    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.pool.validate()
    }
}
