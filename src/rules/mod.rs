//! Round engine and the Scoring Strategy seam.
//!
//! Games implement `ScoringStrategy` to define:
//! - which seats commit each turn and what is public about it
//! - how revealed commitments score
//! - what follows a resolved turn
//!
//! `RoundEngine` enforces the shared state machine, hides commitments until
//! resolution, and applies results to accounts and the pool.

pub mod strategy;
pub mod turn;
pub mod view;
pub mod event;
pub mod engine;

pub use strategy::{Advance, Escalation, GameResult, ScoringStrategy, Seats, TurnPlan, TurnResult};
pub use turn::{CommitmentSlot, Turn};
pub use view::{AccountView, EngineStatus, PoolView, RoundView, SlotView, TurnView, Viewer};
pub use event::{RoundEvent, Transition};
pub use engine::{RoundBuilder, RoundEngine, RoundId};
