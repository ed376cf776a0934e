//! Finite decks and hands drawn without replacement.
//!
//! A `Deck` is used both for the dealer deck of an active role (drawn from
//! the top after a shuffle) and for a participant's hand (the owner picks
//! which value leaves). Either way a value that leaves `remaining` moves to
//! `played` and never comes back.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EngineResult, GameRng, PlayerId};

/// Card value.
pub type CardValue = u8;

/// An owned, ordered set of not-yet-drawn values.
///
/// ## Conservation
///
/// `remaining ∪ played` is always exactly the initial contents.
///
/// ```
/// use duel_rounds::cards::Deck;
/// use duel_rounds::core::PlayerId;
///
/// let mut hand = Deck::with_range(PlayerId::new(0), 1, 5);
/// hand.take(3).unwrap();
/// assert!(!hand.contains(3));
/// assert!(hand.take(3).is_err());
/// assert_eq!(hand.played(), &[3]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    owner: PlayerId,
    /// Top of the deck is the end of the vec.
    remaining: Vec<CardValue>,
    played: Vec<CardValue>,
}

impl Deck {
    #[must_use]
    pub fn new(owner: PlayerId, values: Vec<CardValue>) -> Self {
        Self {
            owner,
            remaining: values,
            played: Vec::new(),
        }
    }

    /// Deck holding each value of `low..=high` once, in ascending order.
    #[must_use]
    pub fn with_range(owner: PlayerId, low: CardValue, high: CardValue) -> Self {
        Self::new(owner, (low..=high).collect())
    }

    /// Same as [`Deck::with_range`], shuffled.
    #[must_use]
    pub fn shuffled(owner: PlayerId, low: CardValue, high: CardValue, rng: &mut GameRng) -> Self {
        let mut deck = Self::with_range(owner, low, high);
        rng.shuffle(&mut deck.remaining);
        deck
    }

    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Values not yet drawn, bottom first.
    #[must_use]
    pub fn remaining(&self) -> &[CardValue] {
        &self.remaining
    }

    /// Values that have left, in the order they left.
    #[must_use]
    pub fn played(&self) -> &[CardValue] {
        &self.played
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    #[must_use]
    pub fn contains(&self, value: CardValue) -> bool {
        self.remaining.contains(&value)
    }

    /// Draw the top value.
    ///
    /// Returns `None` if the deck is exhausted.
    pub fn draw(&mut self) -> Option<CardValue> {
        let value = self.remaining.pop()?;
        self.played.push(value);
        Some(value)
    }

    /// Remove a specific value (playing a card from a hand).
    pub fn take(&mut self, value: CardValue) -> EngineResult<()> {
        let pos = self
            .remaining
            .iter()
            .position(|&v| v == value)
            .ok_or_else(|| self.not_held(value))?;
        self.remaining.remove(pos);
        self.played.push(value);
        Ok(())
    }

    /// Fail with `OutOfRange` unless `value` is still held.
    pub fn ensure_holds(&self, value: CardValue) -> EngineResult<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(self.not_held(value))
        }
    }

    /// Every value this deck started with, sorted.
    #[must_use]
    pub fn contents(&self) -> Vec<CardValue> {
        let mut all: Vec<_> = self.remaining.iter().chain(&self.played).copied().collect();
        all.sort_unstable();
        all
    }

    fn not_held(&self, value: CardValue) -> EngineError {
        let low = self.remaining.iter().min().copied().unwrap_or(0);
        let high = self.remaining.iter().max().copied().unwrap_or(0);
        EngineError::out_of_range("card", value, low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_from_top() {
        let mut deck = Deck::new(PlayerId::new(0), vec![1, 2, 3]);

        assert_eq!(deck.draw(), Some(3));
        assert_eq!(deck.draw(), Some(2));
        assert_eq!(deck.remaining(), &[1]);
        assert_eq!(deck.played(), &[3, 2]);
    }

    #[test]
    fn test_draw_exhausted() {
        let mut deck = Deck::new(PlayerId::new(0), vec![7]);
        assert_eq!(deck.draw(), Some(7));
        assert_eq!(deck.draw(), None);
        assert!(deck.is_empty());
    }

    #[test]
    fn test_take_rejects_missing_value() {
        let mut hand = Deck::with_range(PlayerId::new(1), 1, 11);
        hand.take(11).unwrap();

        let err = hand.take(11).unwrap_err();
        assert!(matches!(err, EngineError::OutOfRange { what: "card", value: 11, .. }));
        assert!(hand.ensure_holds(12).is_err());
        assert!(hand.ensure_holds(1).is_ok());
    }

    #[test]
    fn test_shuffled_keeps_contents() {
        let mut rng = GameRng::new(42);
        let mut deck = Deck::shuffled(PlayerId::new(0), 1, 11, &mut rng);
        deck.draw();
        deck.draw();

        assert_eq!(deck.contents(), (1..=11).collect::<Vec<_>>());
        assert_eq!(deck.len(), 9);
    }

    #[test]
    fn test_independent_decks() {
        let mut a = Deck::with_range(PlayerId::new(0), 1, 3);
        let b = Deck::with_range(PlayerId::new(1), 1, 3);
        a.take(2).unwrap();

        assert!(!a.contains(2));
        assert!(b.contains(2));
    }
}
