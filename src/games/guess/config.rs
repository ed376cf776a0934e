//! Guess-duel scoring constants.

use serde::{Deserialize, Serialize};

use crate::cards::CardValue;
use crate::core::{EngineError, EngineResult};

/// Scoring constants for one guess-duel Round.
///
/// The fixed phase lasts `2 × turns_per_role` turns (11 per active role in
/// the reference rules). A correct directional guess earns
/// `correct_multiplier × d`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuessConfig {
    pub turns_per_role: u32,
    /// Lowest card value in every deck and hand.
    pub card_low: CardValue,
    /// Highest card value in every deck and hand.
    pub card_high: CardValue,
    /// Guesser's reward for a correct EQUAL.
    pub scoring_equal_correct: i64,
    /// Active's reward when the cards match but the guess was not EQUAL.
    pub scoring_equal_wrong: i64,
    pub correct_multiplier: i64,
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            turns_per_role: 11,
            card_low: 1,
            card_high: 11,
            scoring_equal_correct: 10,
            scoring_equal_wrong: 10,
            correct_multiplier: 2,
        }
    }
}

impl GuessConfig {
    #[must_use]
    pub fn with_turns_per_role(mut self, turns: u32) -> Self {
        self.turns_per_role = turns;
        self
    }

    #[must_use]
    pub fn with_cards(mut self, low: CardValue, high: CardValue) -> Self {
        self.card_low = low;
        self.card_high = high;
        self
    }

    #[must_use]
    pub fn with_equal_scores(mut self, correct: i64, wrong: i64) -> Self {
        self.scoring_equal_correct = correct;
        self.scoring_equal_wrong = wrong;
        self
    }

    #[must_use]
    pub fn with_correct_multiplier(mut self, multiplier: i64) -> Self {
        self.correct_multiplier = multiplier;
        self
    }

    /// Turns played before a tie can trigger sudden death.
    #[must_use]
    pub fn fixed_turns(&self) -> u32 {
        self.turns_per_role.saturating_mul(2)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.turns_per_role == 0 {
            return Err(EngineError::InvalidConfig("turns_per_role must be positive".into()));
        }
        if self.card_low > self.card_high {
            return Err(EngineError::InvalidConfig(format!(
                "card range {}..={} is empty",
                self.card_low, self.card_high
            )));
        }
        if self.scoring_equal_correct < 0 || self.scoring_equal_wrong < 0 || self.correct_multiplier < 0 {
            return Err(EngineError::InvalidConfig("rewards must not be negative".into()));
        }
        let widest = i64::from(self.card_high - self.card_low);
        if self.correct_multiplier.checked_mul(widest).is_none() {
            return Err(EngineError::InvalidConfig(format!(
                "correct_multiplier {} overflows on a distance of {widest}",
                self.correct_multiplier
            )));
        }
        Ok(())
    }
}
