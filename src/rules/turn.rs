//! Commitment slots and turns.
//!
//! ## CommitmentSlot
//!
//! One seat's hidden choice. `locked` only goes false→true, except through
//! an explicit reset that clears value and lock together.
//!
//! ## Turn
//!
//! One hidden-commitment-then-reveal unit. `resolved` only goes
//! false→true and `result` is present iff `resolved`. Slot values have no
//! public accessor: the only read path is [`Turn::revealed`], which refuses
//! until the turn is resolved.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EngineError, EngineResult, PlayerId};

use super::strategy::{TurnPlan, TurnResult};
use super::view::{SlotView, TurnView, Viewer};

/// One seat's hidden commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentSlot<M> {
    owner: PlayerId,
    value: Option<M>,
    locked: bool,
}

impl<M> CommitmentSlot<M> {
    #[must_use]
    pub fn new(owner: PlayerId) -> Self {
        Self {
            owner,
            value: None,
            locked: false,
        }
    }

    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Store and lock a value.
    pub fn lock(&mut self, value: M) -> EngineResult<()> {
        if self.locked {
            return Err(EngineError::AlreadyLocked(self.owner));
        }
        self.value = Some(value);
        self.locked = true;
        Ok(())
    }

    /// Clear value and lock together.
    pub fn clear(&mut self) {
        self.value = None;
        self.locked = false;
    }

    fn is_consistent(&self) -> bool {
        self.locked == self.value.is_some()
    }
}

/// One turn (or duel) of a Round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn<M, T> {
    order: u32,
    table: T,
    slots: SmallVec<[CommitmentSlot<M>; 2]>,
    resolved: bool,
    result: Option<TurnResult>,
}

impl<M: Clone, T> Turn<M, T> {
    #[must_use]
    pub fn new(order: u32, plan: TurnPlan<T>) -> Self {
        Self {
            order,
            table: plan.table,
            slots: plan.seats.into_iter().map(CommitmentSlot::new).collect(),
            resolved: false,
            result: None,
        }
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Public information about this turn.
    #[must_use]
    pub fn table(&self) -> &T {
        &self.table
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Score deltas, present iff resolved.
    #[must_use]
    pub fn result(&self) -> Option<&TurnResult> {
        self.result.as_ref()
    }

    /// Seats holding a slot, in slot order.
    pub fn seats(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.slots.iter().map(CommitmentSlot::owner)
    }

    #[must_use]
    pub fn holds_seat(&self, player: PlayerId) -> bool {
        self.slot(player).is_some()
    }

    #[must_use]
    pub fn is_locked(&self, player: PlayerId) -> bool {
        self.slot(player).is_some_and(CommitmentSlot::is_locked)
    }

    /// Number of slots still unlocked.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_locked()).count()
    }

    #[must_use]
    pub fn all_locked(&self) -> bool {
        self.waiting() == 0
    }

    /// A seat's committed value, available only once the turn is resolved.
    pub fn revealed(&self, player: PlayerId) -> EngineResult<&M> {
        let slot = self
            .slot(player)
            .ok_or(EngineError::UnknownParticipant(player))?;
        if !self.resolved {
            return Err(EngineError::Concealed(player));
        }
        slot.value.as_ref().ok_or(EngineError::Concealed(player))
    }

    /// Guards that must pass before `player` may commit.
    pub(crate) fn admit(&self, player: PlayerId) -> EngineResult<()> {
        if self.resolved {
            return Err(EngineError::TurnClosed { order: self.order });
        }
        let slot = self
            .slot(player)
            .ok_or(EngineError::UnknownParticipant(player))?;
        if slot.is_locked() {
            return Err(EngineError::AlreadyLocked(player));
        }
        Ok(())
    }

    pub(crate) fn commit(&mut self, player: PlayerId, value: M) -> EngineResult<()> {
        self.admit(player)?;
        self.slot_mut(player)
            .ok_or(EngineError::UnknownParticipant(player))?
            .lock(value)
    }

    /// Clear the slots of `players` (all slots when empty).
    ///
    /// Returns the seats whose slots were cleared.
    pub(crate) fn reset(&mut self, players: &[PlayerId]) -> EngineResult<Vec<PlayerId>> {
        if self.resolved {
            return Err(EngineError::TurnAlreadyResolved { order: self.order });
        }
        if let Some(&stranger) = players.iter().find(|&&p| !self.holds_seat(p)) {
            return Err(EngineError::UnknownParticipant(stranger));
        }

        let mut cleared = Vec::new();
        for slot in &mut self.slots {
            if players.is_empty() || players.contains(&slot.owner) {
                slot.clear();
                cleared.push(slot.owner);
            }
        }
        Ok(cleared)
    }

    /// All committed values, in slot order. Requires every slot locked.
    pub(crate) fn sealed_moves(&self) -> EngineResult<Vec<(PlayerId, M)>> {
        if self.resolved {
            return Err(EngineError::AlreadyResolved { order: self.order });
        }
        if !self.all_locked() {
            return Err(EngineError::NotAllLocked {
                order: self.order,
                waiting: self.waiting(),
            });
        }
        self.slots
            .iter()
            .map(|slot| match &slot.value {
                Some(value) => Ok((slot.owner, value.clone())),
                None => Err(EngineError::Integrity(format!(
                    "turn {} slot of {} locked without a value",
                    self.order, slot.owner
                ))),
            })
            .collect()
    }

    /// Record the result. Happens exactly once per turn.
    pub(crate) fn close(&mut self, result: TurnResult) -> EngineResult<()> {
        if self.resolved {
            return Err(EngineError::AlreadyResolved { order: self.order });
        }
        self.resolved = true;
        self.result = Some(result);
        Ok(())
    }

    /// Check this turn's own invariants.
    pub(crate) fn check_integrity(&self) -> Result<(), String> {
        if self.resolved != self.result.is_some() {
            return Err(format!(
                "turn {}: resolved={} but result present={}",
                self.order,
                self.resolved,
                self.result.is_some()
            ));
        }
        if let Some(slot) = self.slots.iter().find(|s| !s.is_consistent()) {
            return Err(format!(
                "turn {}: slot of {} has lock and value out of step",
                self.order, slot.owner
            ));
        }
        if self.resolved && !self.all_locked() {
            return Err(format!("turn {}: resolved with open slots", self.order));
        }
        Ok(())
    }

    /// Redacted view for `viewer`, revealing every resolved value.
    #[must_use]
    pub fn view(&self, viewer: Viewer) -> TurnView<M, T>
    where
        T: Clone,
    {
        self.view_with(viewer, |_, value| Some(value.clone()))
    }

    /// Redacted view for `viewer`.
    ///
    /// `reveal` decides which resolved values of other seats the viewer may
    /// see; withheld ones show as [`SlotView::Withheld`]. Token balances in
    /// the result are only kept for the viewer's own seat.
    pub fn view_with(&self, viewer: Viewer, reveal: impl Fn(PlayerId, &M) -> Option<M>) -> TurnView<M, T>
    where
        T: Clone,
    {
        let slots = self
            .slots
            .iter()
            .map(|slot| {
                let own = viewer.is(slot.owner);
                match (&slot.value, self.resolved) {
                    (Some(value), true) if own => SlotView::Revealed {
                        owner: slot.owner,
                        value: value.clone(),
                    },
                    (Some(value), true) => match reveal(slot.owner, value) {
                        Some(value) => SlotView::Revealed {
                            owner: slot.owner,
                            value,
                        },
                        None => SlotView::Withheld { owner: slot.owner },
                    },
                    _ if own => SlotView::Own {
                        owner: slot.owner,
                        value: slot.value.clone(),
                    },
                    _ if slot.locked => SlotView::Locked { owner: slot.owner },
                    _ => SlotView::Open { owner: slot.owner },
                }
            })
            .collect();

        TurnView {
            order: self.order,
            table: self.table.clone(),
            slots,
            resolved: self.resolved,
            result: self.result.as_ref().map(|r| r.for_viewer(viewer)),
        }
    }

    fn slot(&self, player: PlayerId) -> Option<&CommitmentSlot<M>> {
        self.slots.iter().find(|s| s.owner == player)
    }

    fn slot_mut(&mut self, player: PlayerId) -> Option<&mut CommitmentSlot<M>> {
        self.slots.iter_mut().find(|s| s.owner == player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duel() -> Turn<u8, ()> {
        Turn::new(1, TurnPlan::new((), [PlayerId::new(0), PlayerId::new(1)]))
    }

    #[test]
    fn test_slot_lock_once() {
        let mut slot = CommitmentSlot::new(PlayerId::new(0));
        slot.lock(5).unwrap();

        assert!(matches!(slot.lock(6), Err(EngineError::AlreadyLocked(_))));
        slot.clear();
        assert!(!slot.is_locked());
        slot.lock(6).unwrap();
    }

    #[test]
    fn test_commit_guards() {
        let mut turn = duel();
        turn.commit(PlayerId::new(0), 3).unwrap();

        assert!(matches!(
            turn.commit(PlayerId::new(0), 4),
            Err(EngineError::AlreadyLocked(_))
        ));
        assert!(matches!(
            turn.commit(PlayerId::new(7), 4),
            Err(EngineError::UnknownParticipant(_))
        ));
        assert_eq!(turn.waiting(), 1);
    }

    #[test]
    fn test_values_concealed_until_resolved() {
        let mut turn = duel();
        turn.commit(PlayerId::new(0), 3).unwrap();
        turn.commit(PlayerId::new(1), 9).unwrap();

        assert!(matches!(
            turn.revealed(PlayerId::new(0)),
            Err(EngineError::Concealed(_))
        ));

        let moves = turn.sealed_moves().unwrap();
        assert_eq!(moves, vec![(PlayerId::new(0), 3), (PlayerId::new(1), 9)]);

        turn.close(TurnResult::default()).unwrap();
        assert_eq!(turn.revealed(PlayerId::new(1)).unwrap(), &9);
    }

    #[test]
    fn test_sealed_moves_needs_all_locks() {
        let mut turn = duel();
        turn.commit(PlayerId::new(1), 2).unwrap();

        let err = turn.sealed_moves().unwrap_err();
        assert!(matches!(err, EngineError::NotAllLocked { order: 1, waiting: 1 }));
    }

    #[test]
    fn test_close_is_once() {
        let mut turn = duel();
        turn.commit(PlayerId::new(0), 1).unwrap();
        turn.commit(PlayerId::new(1), 1).unwrap();
        turn.close(TurnResult::default().with_delta(PlayerId::new(0), 2)).unwrap();

        let err = turn.close(TurnResult::default()).unwrap_err();
        assert!(err.is_noop());
        assert_eq!(turn.result().unwrap().delta(PlayerId::new(0)), 2);
        assert!(matches!(
            turn.commit(PlayerId::new(0), 1),
            Err(EngineError::TurnClosed { order: 1 })
        ));
    }

    #[test]
    fn test_reset_subset_and_all() {
        let mut turn = duel();
        turn.commit(PlayerId::new(0), 1).unwrap();
        turn.commit(PlayerId::new(1), 2).unwrap();

        assert_eq!(turn.reset(&[PlayerId::new(1)]).unwrap(), vec![PlayerId::new(1)]);
        assert!(turn.is_locked(PlayerId::new(0)));
        assert!(!turn.is_locked(PlayerId::new(1)));

        assert_eq!(turn.reset(&[]).unwrap().len(), 2);
        assert_eq!(turn.waiting(), 2);
    }

    #[test]
    fn test_reset_rejects_stranger_without_clearing() {
        let mut turn = duel();
        turn.commit(PlayerId::new(0), 1).unwrap();

        let err = turn.reset(&[PlayerId::new(0), PlayerId::new(5)]).unwrap_err();
        assert!(matches!(err, EngineError::UnknownParticipant(_)));
        assert!(turn.is_locked(PlayerId::new(0)));
    }

    #[test]
    fn test_view_redacts_other_slots() {
        let mut turn = duel();
        turn.commit(PlayerId::new(0), 8).unwrap();

        let mine = turn.view(Viewer::Participant(PlayerId::new(0)));
        assert_eq!(
            mine.slots[0],
            SlotView::Own {
                owner: PlayerId::new(0),
                value: Some(8)
            }
        );

        let theirs = turn.view(Viewer::Participant(PlayerId::new(1)));
        assert_eq!(theirs.slots[0], SlotView::Locked { owner: PlayerId::new(0) });
        assert_eq!(theirs.slots[1], SlotView::Own { owner: PlayerId::new(1), value: None });

        let spectator = turn.view(Viewer::Spectator);
        assert_eq!(spectator.slots[1], SlotView::Open { owner: PlayerId::new(1) });
    }

    #[test]
    fn test_view_with_withholds_private_values() {
        let mut turn = duel();
        turn.commit(PlayerId::new(0), 8).unwrap();
        turn.commit(PlayerId::new(1), 27).unwrap();
        turn.close(TurnResult::default().with_tokens(PlayerId::new(1), 27))
            .unwrap();

        let hide_large = |_: PlayerId, v: &u8| (*v < 20).then_some(*v);
        let theirs = turn.view_with(Viewer::Participant(PlayerId::new(0)), hide_large);
        assert_eq!(theirs.slots[0], SlotView::Revealed { owner: PlayerId::new(0), value: 8 });
        assert_eq!(theirs.slots[1], SlotView::Withheld { owner: PlayerId::new(1) });
        assert!(theirs.result.unwrap().tokens.is_empty());

        let own = turn.view_with(Viewer::Participant(PlayerId::new(1)), hide_large);
        assert_eq!(own.slots[1], SlotView::Revealed { owner: PlayerId::new(1), value: 27 });
        assert_eq!(own.result.unwrap().tokens.as_slice(), &[(PlayerId::new(1), 27)]);
    }

    #[test]
    fn test_integrity_detects_result_without_resolution() {
        let mut turn = duel();
        turn.result = Some(TurnResult::default());
        assert!(turn.check_integrity().is_err());
    }
}
