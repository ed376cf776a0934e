//! Pure guess-duel scoring.
//!
//! With `d = |A − D|`:
//! - `d == 0`: EQUAL earns the guesser `scoring_equal_correct`, any other
//!   guess earns the active `scoring_equal_wrong`
//! - `d > 0`: the right direction earns the guesser `multiplier × d`, a
//!   wrong direction or EQUAL earns the active `d`
//!
//! Exactly one side gains; the other gets 0.

use serde::{Deserialize, Serialize};

use crate::cards::CardValue;
use crate::core::{EngineError, EngineResult};

use super::config::GuessConfig;

/// The guesser's call on the active's hidden card relative to the dealer card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Guess {
    Higher,
    Lower,
    Equal,
}

impl Guess {
    /// What the guess should have been.
    #[must_use]
    pub fn actual(dealer: CardValue, played: CardValue) -> Self {
        match played.cmp(&dealer) {
            std::cmp::Ordering::Greater => Guess::Higher,
            std::cmp::Ordering::Less => Guess::Lower,
            std::cmp::Ordering::Equal => Guess::Equal,
        }
    }
}

/// Points gained by each role in one turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessScore {
    pub guesser: i64,
    pub active: i64,
}

/// Score one turn.
///
/// ```
/// use duel_rounds::games::guess::{score_turn, Guess, GuessConfig};
///
/// let score = score_turn(3, 9, Guess::Higher, &GuessConfig::default()).unwrap();
/// assert_eq!((score.guesser, score.active), (12, 0));
/// ```
///
/// # Errors
///
/// `Integrity` when `correct_multiplier × d` does not fit an `i64`.
pub fn score_turn(
    dealer: CardValue,
    played: CardValue,
    guess: Guess,
    config: &GuessConfig,
) -> EngineResult<GuessScore> {
    let d = i64::from(dealer.abs_diff(played));
    let actual = Guess::actual(dealer, played);

    Ok(match (actual, guess == actual) {
        (Guess::Equal, true) => GuessScore {
            guesser: config.scoring_equal_correct,
            active: 0,
        },
        (Guess::Equal, false) => GuessScore {
            guesser: 0,
            active: config.scoring_equal_wrong,
        },
        (_, true) => GuessScore {
            guesser: config.correct_multiplier.checked_mul(d).ok_or_else(|| {
                EngineError::Integrity(format!("reward {} x {d} overflows", config.correct_multiplier))
            })?,
            active: 0,
        },
        (_, false) => GuessScore {
            guesser: 0,
            active: d,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_direction_pays_twice_distance() {
        let config = GuessConfig::default();
        assert_eq!(score_turn(3, 9, Guess::Higher, &config).unwrap(), GuessScore { guesser: 12, active: 0 });
        assert_eq!(score_turn(9, 2, Guess::Lower, &config).unwrap(), GuessScore { guesser: 14, active: 0 });
    }

    #[test]
    fn test_wrong_direction_pays_active_distance() {
        let config = GuessConfig::default();
        assert_eq!(score_turn(3, 9, Guess::Lower, &config).unwrap(), GuessScore { guesser: 0, active: 6 });
        assert_eq!(score_turn(3, 9, Guess::Equal, &config).unwrap(), GuessScore { guesser: 0, active: 6 });
    }

    #[test]
    fn test_equal_cards() {
        let config = GuessConfig::default().with_equal_scores(10, 7);
        assert_eq!(score_turn(4, 4, Guess::Equal, &config).unwrap(), GuessScore { guesser: 10, active: 0 });
        assert_eq!(score_turn(4, 4, Guess::Higher, &config).unwrap(), GuessScore { guesser: 0, active: 7 });
    }

    #[test]
    fn test_multiplier_is_configurable() {
        let config = GuessConfig::default().with_correct_multiplier(1);
        assert_eq!(score_turn(1, 11, Guess::Higher, &config).unwrap().guesser, 10);
    }

    #[test]
    fn test_exactly_one_side_gains() {
        let config = GuessConfig::default();
        for dealer in 1..=11u8 {
            for played in 1..=11u8 {
                for guess in [Guess::Higher, Guess::Lower, Guess::Equal] {
                    let s = score_turn(dealer, played, guess, &config).unwrap();
                    assert!(s.guesser == 0 || s.active == 0);
                    assert!(s.guesser + s.active > 0);
                }
            }
        }
    }

    #[test]
    fn test_oversized_reward_is_an_error() {
        let config = GuessConfig::default().with_correct_multiplier(i64::MAX / 2);
        assert_eq!(score_turn(5, 6, Guess::Higher, &config).unwrap().guesser, i64::MAX / 2);
        assert!(matches!(
            score_turn(1, 4, Guess::Higher, &config),
            Err(EngineError::Integrity(_))
        ));
    }
}
