//! Shared economy: the Resource Pool and per-participant accounts.

pub mod pool;
pub mod account;

pub use pool::{ResourcePool, SpendReceipt};
pub use account::{Account, Ledger};
