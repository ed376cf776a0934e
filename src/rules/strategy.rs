//! Scoring Strategy trait for game rule sets.
//!
//! A rule set plugs into [`RoundEngine`](super::RoundEngine) by implementing
//! `ScoringStrategy`:
//! - which seats hold a slot in each turn, and what is public about it
//! - which commitments are legal
//! - how revealed commitments turn into score deltas
//! - what comes after a resolved turn (next turn, escalation, or the end)
//!
//! The engine owns turns, slots, accounts and the pool. The strategy owns
//! its own bookkeeping (decks, baselines, pairings) and never sees a
//! commitment before every slot of the turn is locked.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EngineResult, GameRng, PlayerId};
use crate::economy::{Ledger, ResourcePool, SpendReceipt};

use super::view::Viewer;

/// Result of a completed Round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
    /// Shared first place.
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Result from the seats tied for first place.
    #[must_use]
    pub fn from_leaders(leaders: Vec<PlayerId>) -> Self {
        match leaders.as_slice() {
            [] => GameResult::Draw,
            [one] => GameResult::Winner(*one),
            _ => GameResult::Winners(leaders),
        }
    }

    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }

    /// The single winner, if there is one.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            GameResult::Winner(p) => Some(*p),
            _ => None,
        }
    }
}

/// Seats holding a slot in one turn.
pub type Seats = SmallVec<[PlayerId; 2]>;

/// A turn about to open: its public table and the seats that must commit.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnPlan<T> {
    pub table: T,
    pub seats: Seats,
}

impl<T> TurnPlan<T> {
    pub fn new(table: T, seats: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            table,
            seats: seats.into_iter().collect(),
        }
    }
}

/// Escalation paths taken instead of a normal next turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Escalation {
    /// Scores tied; a two-turn sudden-death pair starts.
    SuddenDeath { pair: u32 },
    /// Odd roster; the challenger must re-commit an illegal token count.
    Challenger {
        challenger: PlayerId,
        opponent: PlayerId,
    },
    /// The forced final duel between challenger and unpaired participant.
    FinalDuel {
        challenger: PlayerId,
        opponent: PlayerId,
    },
}

impl std::fmt::Display for Escalation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Escalation::SuddenDeath { pair } => write!(f, "sudden death pair {pair}"),
            Escalation::Challenger {
                challenger,
                opponent,
            } => write!(f, "{challenger} challenges {opponent}"),
            Escalation::FinalDuel {
                challenger,
                opponent,
            } => write!(f, "final duel {challenger} vs {opponent}"),
        }
    }
}

/// What follows a resolved turn.
#[derive(Clone, Debug, PartialEq)]
pub enum Advance<T> {
    Next {
        plan: TurnPlan<T>,
        escalation: Option<Escalation>,
    },
    Finished(GameResult),
}

/// Account changes produced by resolving one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    /// Score deltas.
    pub deltas: SmallVec<[(PlayerId, i64); 2]>,
    /// New token balances.
    pub tokens: SmallVec<[(PlayerId, u32); 2]>,
    /// Pool spends made on a participant's behalf.
    pub spends: Vec<(PlayerId, SpendReceipt)>,
}

impl TurnResult {
    #[must_use]
    pub fn with_delta(mut self, player: PlayerId, delta: i64) -> Self {
        self.deltas.push((player, delta));
        self
    }

    #[must_use]
    pub fn with_tokens(mut self, player: PlayerId, tokens: u32) -> Self {
        self.tokens.push((player, tokens));
        self
    }

    /// The part of this result `viewer` may see: token balances are
    /// private to their owner.
    #[must_use]
    pub fn for_viewer(&self, viewer: Viewer) -> TurnResult {
        TurnResult {
            deltas: self.deltas.clone(),
            tokens: self.tokens.iter().copied().filter(|(p, _)| viewer.is(*p)).collect(),
            spends: self.spends.clone(),
        }
    }

    /// The part of this result anyone may see.
    #[must_use]
    pub fn public(&self) -> TurnResult {
        self.for_viewer(Viewer::Spectator)
    }

    /// Net score delta for `player`.
    #[must_use]
    pub fn delta(&self, player: PlayerId) -> i64 {
        self.deltas
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, d)| d)
            .sum()
    }
}

/// A game rule set.
///
/// ## Implementation Notes
///
/// - `begin`: called once by `start`; returns the first turn
/// - `check`: reject illegal commitments before they are locked
/// - `settle`: only called once every slot is locked; must not touch the
///   ledger (the engine applies the returned deltas)
/// - `advance`: only called after the current turn resolved
///
/// Any `Err` leaves the Round untouched; `EngineError::Integrity` also
/// freezes it.
pub trait ScoringStrategy: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Scoring constants; immutable once the Round starts.
    type Config: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    /// Phase vocabulary of this rule set.
    type Phase: Copy + Debug + PartialEq + Eq + Serialize + DeserializeOwned + Send + Sync;
    /// One participant's hidden commitment.
    type Move: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    /// Public information about a turn.
    type Table: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    /// Per-viewer game information (own hand, own baseline, ...).
    type Sheet: Clone + Debug + PartialEq + Send + Sync;

    fn config(&self) -> &Self::Config;

    /// Replace the config. The engine only allows this before `start`.
    fn reconfigure(&mut self, config: Self::Config) -> EngineResult<()>;

    fn phase(&self) -> Self::Phase;

    /// Set up the Round and return the first turn.
    fn begin(&mut self, ledger: &Ledger, rng: &mut GameRng) -> EngineResult<TurnPlan<Self::Table>>;

    /// Validate a commitment for the current turn.
    fn check(&self, table: &Self::Table, player: PlayerId, mv: &Self::Move) -> EngineResult<()>;

    /// Score the revealed commitments of a fully locked turn.
    fn settle(
        &mut self,
        table: &Self::Table,
        moves: &[(PlayerId, Self::Move)],
        ledger: &Ledger,
        pool: &mut ResourcePool,
    ) -> EngineResult<TurnResult>;

    /// Decide what follows a resolved turn. `ledger` already holds its deltas.
    fn advance(&mut self, ledger: &Ledger, rng: &mut GameRng) -> EngineResult<Advance<Self::Table>>;

    fn sheet(&self, viewer: Viewer) -> Self::Sheet;

    /// A resolved commitment of `owner` as shown to another `viewer`, or
    /// `None` to keep it private. Owners always see their own commitment.
    fn reveal(&self, _owner: PlayerId, mv: &Self::Move, _viewer: Viewer) -> Option<Self::Move> {
        Some(mv.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(PlayerId::new(1));
        assert!(!result.is_winner(PlayerId::new(0)));
        assert!(result.is_winner(PlayerId::new(1)));
        assert_eq!(result.winner(), Some(PlayerId::new(1)));

        let team = GameResult::Winners(vec![PlayerId::new(0), PlayerId::new(2)]);
        assert!(team.is_winner(PlayerId::new(2)));
        assert_eq!(team.winner(), None);
    }

    #[test]
    fn test_from_leaders() {
        assert_eq!(GameResult::from_leaders(vec![]), GameResult::Draw);
        assert_eq!(
            GameResult::from_leaders(vec![PlayerId::new(3)]),
            GameResult::Winner(PlayerId::new(3))
        );
        assert!(matches!(
            GameResult::from_leaders(vec![PlayerId::new(0), PlayerId::new(1)]),
            GameResult::Winners(_)
        ));
    }

    #[test]
    fn test_turn_result_tokens_stay_with_owner() {
        let result = TurnResult::default()
            .with_delta(PlayerId::new(1), -10)
            .with_tokens(PlayerId::new(0), 20)
            .with_tokens(PlayerId::new(1), 27);

        let own = result.for_viewer(Viewer::Participant(PlayerId::new(1)));
        assert_eq!(own.tokens.as_slice(), &[(PlayerId::new(1), 27)]);
        assert_eq!(own.deltas, result.deltas);
        assert!(result.public().tokens.is_empty());
        assert_eq!(result.public().delta(PlayerId::new(1)), -10);
    }

    #[test]
    fn test_turn_result_delta_sums_entries() {
        let result = TurnResult::default()
            .with_delta(PlayerId::new(0), 50)
            .with_delta(PlayerId::new(1), -25)
            .with_delta(PlayerId::new(0), -10);

        assert_eq!(result.delta(PlayerId::new(0)), 40);
        assert_eq!(result.delta(PlayerId::new(1)), -25);
        assert_eq!(result.delta(PlayerId::new(2)), 0);
    }
}
