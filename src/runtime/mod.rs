//! Async runtime: one actor task per Round.
//!
//! - `RoundActor` owns a `RoundEngine` and serializes every operation on it
//! - `RoundHandle` is the async API callers (humans, bots, operators) use
//! - `Lobby` keeps handles by `RoundId` and resumes Rounds from a `RoundStore`
//!
//! A submit racing a resolve for the same turn is ordered by the actor's
//! queue: whichever arrives second sees the other's effect.

mod actor;
mod handle;
mod lobby;
mod message;
mod store;

pub use handle::RoundHandle;
pub use lobby::Lobby;
pub use message::Notice;
pub use store::{MemoryStore, RoundStore};
