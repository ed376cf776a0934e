//! Randomized search-duel player.

use crate::core::{GameRng, PlayerId};
use crate::games::search::{SearchDuel, SearchMove, SearchTable, Visa};
use crate::rules::RoundView;

use super::Bot;

/// Search-duel bot driven by three probabilities.
#[derive(Clone, Debug)]
pub struct SearchBot {
    seat: PlayerId,
    rng: GameRng,
    /// Chance of entering with illegal tokens.
    pub smuggle_rate: f64,
    /// Chance of searching the opponent.
    pub search_rate: f64,
    /// Chance of paying the visa from the pool.
    pub pool_visa_rate: f64,
    legal_tokens: u32,
    max_tokens: u32,
}

impl SearchBot {
    #[must_use]
    pub fn new(seat: PlayerId, seed: u64) -> Self {
        Self {
            seat,
            rng: GameRng::new(seed),
            smuggle_rate: 0.5,
            search_rate: 0.4,
            pool_visa_rate: 0.5,
            legal_tokens: 20,
            max_tokens: 30,
        }
    }

    /// Token bounds when the Round does not use the defaults.
    #[must_use]
    pub fn with_token_bounds(mut self, legal: u32, max: u32) -> Self {
        self.legal_tokens = legal;
        self.max_tokens = max;
        self
    }

    fn illegal_count(&mut self) -> u32 {
        let extra = self.max_tokens.saturating_sub(self.legal_tokens).max(1) as usize;
        self.legal_tokens + 1 + self.rng.gen_range_usize(0..extra) as u32
    }
}

impl Bot<SearchDuel> for SearchBot {
    fn seat(&self) -> PlayerId {
        self.seat
    }

    fn decide(&mut self, view: &RoundView<SearchDuel>) -> Option<SearchMove> {
        let mv = match view.current.as_ref()?.table {
            SearchTable::Entry => {
                let visa = if self.rng.gen_bool(self.pool_visa_rate) {
                    Visa::Pool
                } else {
                    Visa::Percent
                };
                let tokens = if self.rng.gen_bool(self.smuggle_rate) {
                    self.illegal_count()
                } else {
                    self.legal_tokens
                };
                SearchMove::enter(visa, tokens)
            }
            SearchTable::Duel { .. } => SearchMove::Search(self.rng.gen_bool(self.search_rate)),
            SearchTable::Recommit { .. } => SearchMove::Recommit(self.illegal_count()),
        };
        Some(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_count_in_forced_range() {
        let mut bot = SearchBot::new(PlayerId::new(0), 9);
        for _ in 0..100 {
            let tokens = bot.illegal_count();
            assert!((21..=30).contains(&tokens));
        }
    }
}
