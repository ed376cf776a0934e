//! Redacted read models.
//!
//! Every external read path goes through these types. A slot value is only
//! present when the viewer owns the slot or the turn is resolved; token
//! balances are only present for the viewer's own account.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::economy::{Ledger, ResourcePool};

use super::strategy::{GameResult, ScoringStrategy, TurnResult};

/// Who is reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Viewer {
    Participant(PlayerId),
    /// Presentation layer, operators, anyone without a seat.
    Spectator,
}

impl Viewer {
    #[must_use]
    pub fn is(&self, player: PlayerId) -> bool {
        *self == Viewer::Participant(player)
    }
}

/// Engine-level position in the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStatus {
    NotStarted,
    Open { order: u32 },
    Resolved { order: u32 },
    Finished,
}

/// A slot as seen by one viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotView<M> {
    /// Someone else's slot, not locked yet.
    Open { owner: PlayerId },
    /// Someone else's slot, locked; the value stays hidden.
    Locked { owner: PlayerId },
    /// The viewer's own slot.
    Own { owner: PlayerId, value: Option<M> },
    /// Any slot of a resolved turn.
    Revealed { owner: PlayerId, value: M },
    /// Someone else's slot of a resolved turn whose value the rule set
    /// keeps private.
    Withheld { owner: PlayerId },
}

impl<M> SlotView<M> {
    #[must_use]
    pub fn owner(&self) -> PlayerId {
        match self {
            SlotView::Open { owner }
            | SlotView::Locked { owner }
            | SlotView::Own { owner, .. }
            | SlotView::Revealed { owner, .. }
            | SlotView::Withheld { owner } => *owner,
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        match self {
            SlotView::Open { .. } => false,
            SlotView::Locked { .. } | SlotView::Revealed { .. } | SlotView::Withheld { .. } => true,
            SlotView::Own { value, .. } => value.is_some(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnView<M, T> {
    pub order: u32,
    pub table: T,
    pub slots: Vec<SlotView<M>>,
    pub resolved: bool,
    pub result: Option<TurnResult>,
}

impl<M, T> TurnView<M, T> {
    /// The slot of `player`, if they hold one.
    #[must_use]
    pub fn slot(&self, player: PlayerId) -> Option<&SlotView<M>> {
        self.slots.iter().find(|s| s.owner() == player)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub player: PlayerId,
    pub score: i64,
    /// Only set for the viewer's own account.
    pub tokens: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolView {
    pub initial: u64,
    pub spent: u64,
    pub floor_percent: u8,
    pub available: u64,
}

impl PoolView {
    pub(crate) fn of(pool: &ResourcePool) -> Self {
        Self {
            initial: pool.initial(),
            spent: pool.spent(),
            floor_percent: pool.floor_percent(),
            available: pool.available(),
        }
    }
}

pub(crate) fn accounts_for(ledger: &Ledger, viewer: Viewer) -> Vec<AccountView> {
    ledger
        .iter()
        .map(|(player, account)| AccountView {
            player,
            score: account.score,
            tokens: if viewer.is(player) { account.tokens } else { None },
        })
        .collect()
}

/// Everything one viewer may see of a Round.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundView<S: ScoringStrategy> {
    pub revision: u64,
    pub viewer: Viewer,
    pub phase: S::Phase,
    pub status: EngineStatus,
    /// The addressable current turn, resolved or not.
    pub current: Option<TurnView<S::Move, S::Table>>,
    /// Earlier turns, all resolved.
    pub history: Vec<TurnView<S::Move, S::Table>>,
    pub accounts: Vec<AccountView>,
    pub pool: PoolView,
    pub result: Option<GameResult>,
    pub frozen: Option<String>,
    pub sheet: S::Sheet,
}

impl<S: ScoringStrategy> RoundView<S> {
    /// Score of `player` as shown to this viewer.
    #[must_use]
    pub fn score(&self, player: PlayerId) -> Option<i64> {
        self.accounts
            .iter()
            .find(|a| a.player == player)
            .map(|a| a.score)
    }

    /// True when `player` must still commit to the current turn.
    #[must_use]
    pub fn awaits(&self, player: PlayerId) -> bool {
        matches!(self.status, EngineStatus::Open { .. })
            && self
                .current
                .as_ref()
                .and_then(|turn| turn.slot(player))
                .is_some_and(|slot| !slot.is_locked())
    }
}
