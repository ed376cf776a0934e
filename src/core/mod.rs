//! Core types shared by every game: seats, RNG, round options, errors.

pub mod player;
pub mod rng;
pub mod config;
pub mod error;

pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use config::{PoolConfig, ResolveMode, RoundOptions};
pub use error::{EngineError, EngineResult, StoreError};
