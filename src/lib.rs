//! # duel-rounds
//!
//! A server-authoritative round engine for hidden-commitment duels.
//!
//! ## Design Principles
//!
//! 1. **Commit, then reveal**: every participant of a turn locks a hidden
//!    commitment; nothing is revealed or scored until all slots are locked.
//!
//! 2. **One writer per Round**: a Round is a plain owned value. The async
//!    runtime gives each Round its own actor task; Rounds share nothing.
//!
//! 3. **All-or-nothing**: operations run on a draft and only replace the
//!    Round on success. Broken invariants freeze the Round.
//!
//! ## Architecture
//!
//! - **Pluggable scoring**: `RoundEngine<S: ScoringStrategy>` drives the
//!   shared state machine; each game supplies a strategy.
//!
//! - **Persistent Data Structures**: turn history is an `im::Vector`, so
//!   drafts and snapshots are cheap.
//!
//! - **Redacted reads**: every read goes through `RoundView`, built per
//!   viewer.
//!
//! ## Modules
//!
//! - `core`: seats, RNG, round options, errors
//! - `economy`: resource pool, accounts, ledger
//! - `cards`: finite decks and hands
//! - `rules`: scoring strategy seam, turns, engine, views, events
//! - `games`: guess duel and search duel
//! - `runtime`: Round actors, handles, lobby, snapshot store
//! - `bots`: automated participants

pub mod core;
pub mod economy;
pub mod cards;
pub mod rules;
pub mod games;
pub mod runtime;
pub mod bots;

// Re-export commonly used types
pub use crate::core::{
    EngineError, EngineResult, StoreError,
    PlayerId, PlayerMap,
    GameRng, GameRngState,
    PoolConfig, ResolveMode, RoundOptions,
};

pub use crate::economy::{Account, Ledger, ResourcePool, SpendReceipt};

pub use crate::cards::{CardValue, Deck};

pub use crate::rules::{
    ScoringStrategy, TurnPlan, TurnResult, Advance, Escalation, GameResult,
    CommitmentSlot, Turn,
    RoundBuilder, RoundEngine, RoundId,
    RoundView, TurnView, SlotView, AccountView, PoolView, EngineStatus, Viewer,
    RoundEvent, Transition,
};

pub use crate::runtime::{Lobby, MemoryStore, Notice, RoundHandle, RoundStore};
