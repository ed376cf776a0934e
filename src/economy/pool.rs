//! Shared, depletable Resource Pool with a spend floor.

use serde::{Deserialize, Serialize};

use crate::core::PoolConfig;

/// Outcome of a [`ResourcePool::spend`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendReceipt {
    pub requested: u64,
    /// Amount actually taken from the pool.
    pub actual: u64,
    /// True when `actual < requested`.
    pub capped: bool,
}

impl SpendReceipt {
    /// Part of the request the pool could not cover.
    #[must_use]
    pub fn shortfall(&self) -> u64 {
        self.requested - self.actual
    }
}

/// A common fund that can never be spent below its floor.
///
/// Invariant: `spent <= initial * (100 - floor_percent) / 100`.
///
/// ```
/// use duel_rounds::economy::ResourcePool;
///
/// let mut pool = ResourcePool::new(1_000, 20);
/// assert_eq!(pool.spend(700).actual, 700);
/// let receipt = pool.spend(300);
/// assert_eq!(receipt.actual, 100);
/// assert!(receipt.capped);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    initial: u64,
    spent: u64,
    floor_percent: u8,
}

impl ResourcePool {
    /// `floor_percent` above 100 is clamped to 100 (nothing spendable).
    #[must_use]
    pub fn new(initial: u64, floor_percent: u8) -> Self {
        Self {
            initial,
            spent: 0,
            floor_percent: floor_percent.min(100),
        }
    }

    #[must_use]
    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(config.initial, config.floor_percent)
    }

    #[must_use]
    pub fn initial(&self) -> u64 {
        self.initial
    }

    #[must_use]
    pub fn spent(&self) -> u64 {
        self.spent
    }

    #[must_use]
    pub fn floor_percent(&self) -> u8 {
        self.floor_percent
    }

    /// Current balance.
    #[must_use]
    pub fn balance(&self) -> u64 {
        self.initial - self.spent
    }

    /// Most that can ever be spent over the pool's lifetime.
    #[must_use]
    pub fn spend_cap(&self) -> u64 {
        let spendable = u128::from(self.initial) * u128::from(100 - self.floor_percent) / 100;
        spendable as u64
    }

    /// What can still be spent right now.
    #[must_use]
    pub fn available(&self) -> u64 {
        self.spend_cap().saturating_sub(self.spent)
    }

    /// Spend up to `amount`, capping at the floor. Never fails.
    pub fn spend(&mut self, amount: u64) -> SpendReceipt {
        let actual = amount.min(self.available());
        self.spent += actual;
        SpendReceipt {
            requested: amount,
            actual,
            capped: actual < amount,
        }
    }

    /// Check the floor invariant, e.g. on restored state.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.floor_percent <= 100 && self.spent <= self.spend_cap()
    }
}
