//! Randomized guess-duel player.

use crate::core::{GameRng, PlayerId};
use crate::games::guess::{Guess, GuessDuel, GuessMove};
use crate::rules::RoundView;

use super::Bot;

/// Guess-duel bot.
///
/// As the active it plays the card farthest from the dealer card with
/// probability `bluff`, otherwise a random card from its hand. As the
/// guesser it calls the direction with more room, and EQUAL with
/// probability `equal_rate`.
#[derive(Clone, Debug)]
pub struct GuessBot {
    seat: PlayerId,
    rng: GameRng,
    pub bluff: f64,
    pub equal_rate: f64,
}

impl GuessBot {
    #[must_use]
    pub fn new(seat: PlayerId, seed: u64) -> Self {
        Self {
            seat,
            rng: GameRng::new(seed),
            bluff: 0.6,
            equal_rate: 0.1,
        }
    }
}

impl Bot<GuessDuel> for GuessBot {
    fn seat(&self) -> PlayerId {
        self.seat
    }

    fn decide(&mut self, view: &RoundView<GuessDuel>) -> Option<GuessMove> {
        let table = &view.current.as_ref()?.table;

        if table.active == self.seat {
            let hand = view.sheet.hand.as_deref()?;
            let card = if self.rng.gen_bool(self.bluff) {
                hand.iter().copied().max_by_key(|&c| c.abs_diff(table.dealer))?
            } else {
                *self.rng.choose(hand)?
            };
            return Some(GuessMove::Play(card));
        }

        if self.rng.gen_bool(self.equal_rate) {
            return Some(GuessMove::Guess(Guess::Equal));
        }
        // Dealer card in the lower half: more cards lie above it.
        let mid = 6;
        Some(GuessMove::Guess(if table.dealer <= mid {
            Guess::Higher
        } else {
            Guess::Lower
        }))
    }
}
