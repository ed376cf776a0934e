//! Guess-the-card duel.
//!
//! Two participants alternate the active role. The active plays a hidden
//! card from their hand against a face-up dealer card; the guesser calls
//! HIGHER, LOWER or EQUAL. After the fixed turns a tie starts sudden death,
//! played in two-turn pairs compared on the pair's own gains.

mod config;
mod duel;
mod scoring;

pub use config::GuessConfig;
pub use duel::{GuessDuel, GuessMove, GuessPhase, GuessSheet, GuessTable};
pub use scoring::{score_turn, Guess, GuessScore};
