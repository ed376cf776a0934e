//! Deterministic, persistable random number generation.
//!
//! Every Round owns one `GameRng`, seeded at creation. It shuffles dealer
//! decks and nothing else inside the engine; bots carry their own.
//!
//! The generator serializes as a [`GameRngState`] (seed + ChaCha8 word
//! position), so a restored Round continues the exact same sequence.
//!
//! ```
//! use duel_rounds::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::from_state(&a.state());
//! assert_eq!(a.gen_range(0..100), b.gen_range(0..100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded ChaCha8 generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "GameRngState", into = "GameRngState")]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Derive an independent generator, e.g. one per bot seat.
    #[must_use]
    pub fn derive(&self, salt: u64) -> Self {
        Self::new(self.seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    pub fn gen_range(&mut self, range: std::ops::Range<i32>) -> i32 {
        self.inner.gen_range(range)
    }

    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Random boolean with the given probability of `true` (clamped to [0, 1]).
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable generator position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

impl From<GameRngState> for GameRng {
    fn from(state: GameRngState) -> Self {
        GameRng::from_state(&state)
    }
}

impl From<GameRng> for GameRngState {
    fn from(rng: GameRng) -> Self {
        rng.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_range(0..1000), rng2.gen_range(0..1000));
        }
    }

    #[test]
    fn test_derive_is_independent_and_stable() {
        let base = GameRng::new(42);
        let mut a1 = base.derive(1);
        let mut a2 = base.derive(1);
        let mut b = base.derive(2);

        let s1: Vec<_> = (0..10).map(|_| a1.gen_range(0..1000)).collect();
        let s2: Vec<_> = (0..10).map(|_| a2.gen_range(0..1000)).collect();
        let s3: Vec<_> = (0..10).map(|_| b.gen_range(0..1000)).collect();

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
    }

    #[test]
    fn test_state_round_trip_continues_sequence() {
        let mut rng = GameRng::new(42);
        for _ in 0..50 {
            rng.gen_range(0..1000);
        }

        let mut restored = GameRng::from_state(&rng.state());
        let expected: Vec<_> = (0..10).map(|_| rng.gen_range(0..1000)).collect();
        let actual: Vec<_> = (0..10).map(|_| restored.gen_range(0..1000)).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_serde_goes_through_state() {
        let mut rng = GameRng::new(9);
        rng.gen_range(0..10);

        let bytes = bincode::serialize(&rng).unwrap();
        let mut back: GameRng = bincode::deserialize(&bytes).unwrap();

        assert_eq!(back.state(), rng.state());
        assert_eq!(back.gen_range(0..1000), rng.gen_range(0..1000));
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(42);
        let mut data: Vec<u8> = (1..=11).collect();
        rng.shuffle(&mut data);

        data.sort_unstable();
        assert_eq!(data, (1..=11).collect::<Vec<u8>>());
    }
}
