//! The Turn/Duel engine.
//!
//! `RoundEngine` is the state machine shared by every rule set:
//!
//! ```text
//! NotStarted --start--> Open(1)
//! Open(n)    --submit--> Open(n)         (one slot locked)
//! Open(n)    --resolve--> Resolved(n)    (all slots locked)
//! Resolved(n) --advance--> Open(n+1) | escalation turn | Finished
//! ```
//!
//! ## Atomicity
//!
//! Every operation runs against a draft clone (turn history is an
//! `im::Vector`, so the clone is cheap) and replaces the live state only on
//! success. A failed operation leaves the Round exactly as it was.
//!
//! ## Integrity
//!
//! A violated invariant, found while operating or on restore, freezes the
//! Round. A frozen Round refuses every operation; nothing is repaired.

use im::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{
    EngineError, EngineResult, GameRng, PlayerId, ResolveMode, RoundOptions, StoreError,
};
use crate::economy::{Ledger, ResourcePool};

use super::event::{RoundEvent, Transition};
use super::strategy::{Advance, GameResult, ScoringStrategy};
use super::turn::Turn;
use super::view::{accounts_for, EngineStatus, PoolView, RoundView, TurnView, Viewer};

/// Round identity.
pub type RoundId = Uuid;

/// Builder for a Round.
///
/// Seats are assigned in join order.
///
/// ```
/// use duel_rounds::games::guess::GuessDuel;
/// use duel_rounds::rules::RoundBuilder;
///
/// let round = RoundBuilder::new()
///     .join(0)
///     .join(0)
///     .build(GuessDuel::default())
///     .unwrap();
/// assert_eq!(round.ledger().len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RoundBuilder {
    id: Option<RoundId>,
    scores: Vec<i64>,
    options: RoundOptions,
}

impl RoundBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: RoundId) -> Self {
        self.id = Some(id);
        self
    }

    /// Add a participant with a starting score.
    #[must_use]
    pub fn join(mut self, starting_score: i64) -> Self {
        self.scores.push(starting_score);
        self
    }

    /// Add `count` participants with the same starting score.
    #[must_use]
    pub fn seats(mut self, count: usize, starting_score: i64) -> Self {
        self.scores
            .extend(std::iter::repeat(starting_score).take(count));
        self
    }

    #[must_use]
    pub fn options(mut self, options: RoundOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build<S: ScoringStrategy>(self, strategy: S) -> EngineResult<RoundEngine<S>> {
        self.options.validate()?;
        if self.scores.is_empty() || self.scores.len() > 255 {
            return Err(EngineError::InvalidConfig(format!(
                "a round needs 1-255 participants, got {}",
                self.scores.len()
            )));
        }

        Ok(RoundEngine {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            options: self.options,
            strategy,
            ledger: Ledger::new(&self.scores),
            pool: ResourcePool::from_config(&self.options.pool),
            turns: Vector::new(),
            result: None,
            rng: GameRng::new(self.options.seed),
            revision: 0,
            frozen: None,
        })
    }
}

/// Session state of one Round, owned by a single writer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct RoundEngine<S: ScoringStrategy> {
    id: RoundId,
    options: RoundOptions,
    strategy: S,
    ledger: Ledger,
    pool: ResourcePool,
    turns: Vector<Turn<S::Move, S::Table>>,
    result: Option<GameResult>,
    rng: GameRng,
    revision: u64,
    frozen: Option<String>,
}

impl<S: ScoringStrategy> RoundEngine<S> {
    #[must_use]
    pub fn id(&self) -> RoundId {
        self.id
    }

    #[must_use]
    pub fn options(&self) -> &RoundOptions {
        &self.options
    }

    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    #[must_use]
    pub fn phase(&self) -> S::Phase {
        self.strategy.phase()
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Incremented by every committed operation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn frozen(&self) -> Option<&str> {
        self.frozen.as_deref()
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn<S::Move, S::Table>> {
        self.turns.iter()
    }

    /// The one addressable turn: the latest created.
    #[must_use]
    pub fn current_turn(&self) -> Option<&Turn<S::Move, S::Table>> {
        self.turns.back()
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        if self.result.is_some() {
            return EngineStatus::Finished;
        }
        match self.turns.back() {
            None => EngineStatus::NotStarted,
            Some(turn) if turn.is_resolved() => EngineStatus::Resolved {
                order: turn.order(),
            },
            Some(turn) => EngineStatus::Open {
                order: turn.order(),
            },
        }
    }

    // === Operations ===

    /// Replace scoring constants. Only before `start`.
    pub fn reconfigure(&mut self, config: S::Config) -> EngineResult<Transition> {
        self.transact("reconfigure", |round, events| {
            round.ensure_not_started("reconfigure")?;
            round.strategy.reconfigure(config)?;
            events.push(RoundEvent::Reconfigured);
            Ok(())
        })
    }

    /// Start the Round and open turn 1.
    pub fn start(&mut self) -> EngineResult<Transition> {
        self.transact("start", |round, events| {
            round.ensure_not_started("start")?;
            let plan = round.strategy.begin(&round.ledger, &mut round.rng)?;
            events.push(RoundEvent::Started);
            round.open(Turn::new(1, plan), events);
            tracing::info!(round = %round.id, phase = ?round.strategy.phase(), "round started");
            Ok(())
        })
    }

    /// Lock `player`'s commitment for the current turn.
    ///
    /// In [`ResolveMode::Auto`] the turn also resolves when this was the
    /// last open slot.
    pub fn submit(&mut self, player: PlayerId, mv: S::Move) -> EngineResult<Transition> {
        self.transact("submit", |round, events| {
            let turn = round
                .turns
                .back()
                .ok_or_else(|| EngineError::InvalidTransition("round has not started".into()))?;
            let order = turn.order();
            turn.admit(player)?;
            round.strategy.check(turn.table(), player, &mv)?;

            round.current_mut()?.commit(player, mv)?;
            events.push(RoundEvent::Committed { order, player });
            tracing::debug!(round = %round.id, order, %player, "commitment locked");

            let all_locked = round.turns.back().is_some_and(|t| t.all_locked());
            if round.options.resolve == ResolveMode::Auto && all_locked {
                round.settle_current(events)?;
            }
            Ok(())
        })
    }

    /// Reveal and score the current turn.
    ///
    /// Fails with `NotAllLocked` while any slot is open, and with the
    /// no-op `AlreadyResolved` when called again.
    pub fn resolve(&mut self) -> EngineResult<Transition> {
        self.transact("resolve", |round, events| round.settle_current(events))
    }

    /// Move past a resolved turn.
    pub fn advance(&mut self) -> EngineResult<Transition> {
        self.transact("advance", |round, events| {
            if round.result.is_some() {
                return Err(EngineError::InvalidTransition("round is finished".into()));
            }
            let turn = round
                .turns
                .back()
                .ok_or_else(|| EngineError::InvalidTransition("round has not started".into()))?;
            let order = turn.order();
            if !turn.is_resolved() {
                return Err(EngineError::NotResolved { order });
            }

            match round.strategy.advance(&round.ledger, &mut round.rng)? {
                Advance::Next { plan, escalation } => {
                    if let Some(escalation) = escalation {
                        tracing::info!(round = %round.id, %escalation, "escalating");
                        events.push(RoundEvent::Escalated(escalation));
                    }
                    round.open(Turn::new(order + 1, plan), events);
                }
                Advance::Finished(result) => {
                    tracing::info!(round = %round.id, ?result, "round finished");
                    round.result = Some(result.clone());
                    events.push(RoundEvent::Finished(result));
                }
            }
            Ok(())
        })
    }

    /// Clear slots of the current unresolved turn (all when `players` is empty).
    pub fn reset(&mut self, players: &[PlayerId]) -> EngineResult<Transition> {
        self.transact("reset", |round, events| {
            let turn = round.current_mut()?;
            let order = turn.order();
            let cleared = turn.reset(players)?;
            tracing::debug!(round = %round.id, order, ?cleared, "slots reset");
            events.push(RoundEvent::SlotsReset {
                order,
                players: cleared,
            });
            Ok(())
        })
    }

    /// What `viewer` may see.
    #[must_use]
    pub fn view(&self, viewer: Viewer) -> RoundView<S> {
        let count = self.turns.len();
        let history = self
            .turns
            .iter()
            .take(count.saturating_sub(1))
            .map(|t| self.turn_view(t, viewer))
            .collect();

        RoundView {
            revision: self.revision,
            viewer,
            phase: self.strategy.phase(),
            status: self.status(),
            current: self.turns.back().map(|t| self.turn_view(t, viewer)),
            history,
            accounts: accounts_for(&self.ledger, viewer),
            pool: PoolView::of(&self.pool),
            result: self.result.clone(),
            frozen: self.frozen.clone(),
            sheet: self.strategy.sheet(viewer),
        }
    }

    // === Persistence ===

    /// Encode the full state.
    pub fn snapshot(&self) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a snapshot and re-check every invariant.
    ///
    /// A snapshot that decodes but violates an invariant comes back frozen.
    pub fn restore(bytes: &[u8]) -> EngineResult<Self> {
        let mut round: Self = bincode::deserialize(bytes).map_err(StoreError::from)?;
        if let Err(reason) = round.verify() {
            tracing::error!(round = %round.id, %reason, "restored round violates invariants, freezing");
            round.frozen = Some(reason);
        }
        Ok(round)
    }

    /// Check the Round invariants.
    pub fn verify(&self) -> Result<(), String> {
        let count = self.turns.len();
        for (i, turn) in self.turns.iter().enumerate() {
            let expected = i as u32 + 1;
            if turn.order() != expected {
                return Err(format!(
                    "turn at position {i} has order {}, expected {expected}",
                    turn.order()
                ));
            }
            turn.check_integrity()?;
            if i + 1 < count && !turn.is_resolved() {
                return Err(format!("turn {} is unresolved but not current", turn.order()));
            }
            if let Some(stranger) = turn.seats().find(|&p| self.ledger.account(p).is_err()) {
                return Err(format!("turn {} seats unknown {stranger}", turn.order()));
            }
        }
        if self.result.is_some() && !self.turns.back().is_some_and(|t| t.is_resolved()) {
            return Err("round has a result but its last turn is open".into());
        }
        if !self.pool.is_consistent() {
            return Err(format!(
                "pool spent {} beyond its cap {}",
                self.pool.spent(),
                self.pool.spend_cap()
            ));
        }
        Ok(())
    }

    // === Internals ===

    /// Run `op` on a draft and commit it on success.
    fn transact(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&mut Self, &mut Vec<RoundEvent>) -> EngineResult<()>,
    ) -> EngineResult<Transition> {
        if let Some(reason) = &self.frozen {
            return Err(EngineError::Frozen(reason.clone()));
        }

        let mut draft = self.clone();
        let mut events = Vec::new();
        match op(&mut draft, &mut events) {
            Ok(()) => {
                draft.revision += 1;
                *self = draft;
                Ok(Transition {
                    revision: self.revision,
                    events,
                })
            }
            Err(EngineError::Integrity(reason)) => {
                tracing::error!(round = %self.id, op = name, %reason, "integrity violation, freezing round");
                self.frozen = Some(reason.clone());
                Err(EngineError::Integrity(reason))
            }
            Err(err) => {
                tracing::debug!(round = %self.id, op = name, %err, "operation rejected");
                Err(err)
            }
        }
    }

    fn turn_view(&self, turn: &Turn<S::Move, S::Table>, viewer: Viewer) -> TurnView<S::Move, S::Table> {
        turn.view_with(viewer, |owner, mv| self.strategy.reveal(owner, mv, viewer))
    }

    fn ensure_not_started(&self, op: &str) -> EngineResult<()> {
        if self.status() == EngineStatus::NotStarted {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition(format!(
                "{op} is only allowed before the round starts"
            )))
        }
    }

    fn current_mut(&mut self) -> EngineResult<&mut Turn<S::Move, S::Table>> {
        let last = self
            .turns
            .len()
            .checked_sub(1)
            .ok_or_else(|| EngineError::InvalidTransition("round has not started".into()))?;
        self.turns
            .get_mut(last)
            .ok_or_else(|| EngineError::Integrity("current turn vanished".into()))
    }

    fn open(&mut self, turn: Turn<S::Move, S::Table>, events: &mut Vec<RoundEvent>) {
        events.push(RoundEvent::TurnOpened {
            order: turn.order(),
            seats: turn.seats().collect(),
        });
        self.turns.push_back(turn);
    }

    fn settle_current(&mut self, events: &mut Vec<RoundEvent>) -> EngineResult<()> {
        let turn = self
            .turns
            .back()
            .ok_or_else(|| EngineError::InvalidTransition("round has not started".into()))?;
        let order = turn.order();
        let moves = turn.sealed_moves()?;
        let table = turn.table().clone();

        let result = self
            .strategy
            .settle(&table, &moves, &self.ledger, &mut self.pool)?;

        for &(player, delta) in &result.deltas {
            self.ledger.credit(player, delta)?;
        }
        for &(player, tokens) in &result.tokens {
            self.ledger.set_tokens(player, tokens)?;
        }
        for &(player, receipt) in result.spends.iter().filter(|(_, r)| r.capped) {
            tracing::warn!(
                round = %self.id,
                %player,
                requested = receipt.requested,
                actual = receipt.actual,
                "pool spend capped at floor"
            );
            events.push(RoundEvent::PoolCapped { player, receipt });
        }

        // Broadcast events carry no token balances.
        let public = result.public();
        self.current_mut()?.close(result)?;
        tracing::debug!(round = %self.id, order, "turn resolved");
        events.push(RoundEvent::TurnResolved {
            order,
            result: public,
        });
        Ok(())
    }
}
