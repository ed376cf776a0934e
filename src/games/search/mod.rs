//! Search-or-pass duel.
//!
//! Every participant first pays a visa and enters with a token count; any
//! tokens above the legal amount are smuggled. Participants are then paired
//! into duels where each side secretly decides whether to search the other.
//! Gains and losses are percentages of a fixed post-visa baseline.

mod config;
mod duel;
mod pairing;
mod scoring;

pub use config::SearchConfig;
pub use duel::{EntryChoice, SearchDuel, SearchMove, SearchPhase, SearchSheet, SearchTable, Visa};
pub use pairing::{select_challenger, Pairing, Teams};
pub use scoring::{percent_of, score_direction, score_duel, Direction, DuelSide, SideOutcome};
