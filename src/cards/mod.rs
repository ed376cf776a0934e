//! Decks and hands.
//!
//! Values are plain numbers; a game decides what they mean. Two decks with
//! the same range are independent objects (one dealer deck per active role,
//! one hand per participant).

pub mod deck;

pub use deck::{CardValue, Deck};
