//! State-changed events.
//!
//! Produced by every committed transition and broadcast to subscribers by
//! the runtime. Events never carry a commitment before its turn resolves:
//! `Committed` only names the seat. `TurnResolved` carries the public part
//! of the result (score deltas and pool spends, no token balances).

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::economy::SpendReceipt;

use super::strategy::{Escalation, GameResult, TurnResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    Reconfigured,
    Started,
    TurnOpened { order: u32, seats: Vec<PlayerId> },
    Committed { order: u32, player: PlayerId },
    SlotsReset { order: u32, players: Vec<PlayerId> },
    TurnResolved { order: u32, result: TurnResult },
    /// A pool spend was only partially applied.
    PoolCapped { player: PlayerId, receipt: SpendReceipt },
    Escalated(Escalation),
    Finished(GameResult),
}

impl std::fmt::Display for RoundEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundEvent::Reconfigured => write!(f, "reconfigured"),
            RoundEvent::Started => write!(f, "started"),
            RoundEvent::TurnOpened { order, seats } => {
                let seats = seats.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ");
                write!(f, "turn {order} opened for {seats}")
            }
            RoundEvent::Committed { order, player } => write!(f, "{player} locked turn {order}"),
            RoundEvent::SlotsReset { order, players } => {
                write!(f, "turn {order}: {} slot(s) reset", players.len())
            }
            RoundEvent::TurnResolved { order, result } => {
                let deltas = result
                    .deltas
                    .iter()
                    .map(|(p, d)| format!("{p} {d:+}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "turn {order} resolved: {deltas}")
            }
            RoundEvent::PoolCapped { player, receipt } => write!(
                f,
                "pool capped for {player}: {} of {}",
                receipt.actual, receipt.requested
            ),
            RoundEvent::Escalated(escalation) => write!(f, "escalation: {escalation}"),
            RoundEvent::Finished(result) => write!(f, "finished: {result:?}"),
        }
    }
}

/// What a successful operation changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Revision of the Round after the operation.
    pub revision: u64,
    pub events: Vec<RoundEvent>,
}

impl Transition {
    /// The result of the turn resolved by this transition, if any.
    #[must_use]
    pub fn resolved(&self) -> Option<&TurnResult> {
        self.events.iter().find_map(|e| match e {
            RoundEvent::TurnResolved { result, .. } => Some(result),
            _ => None,
        })
    }

    #[must_use]
    pub fn finished(&self) -> Option<&GameResult> {
        self.events.iter().find_map(|e| match e {
            RoundEvent::Finished(result) => Some(result),
            _ => None,
        })
    }

    #[must_use]
    pub fn escalation(&self) -> Option<&Escalation> {
        self.events.iter().find_map(|e| match e {
            RoundEvent::Escalated(escalation) => Some(escalation),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_committed_event_names_seat_only() {
        let event = RoundEvent::Committed {
            order: 3,
            player: PlayerId::new(1),
        };
        assert_eq!(event.to_string(), "P1 locked turn 3");
    }

    #[test]
    fn test_transition_lookups() {
        let result = TurnResult::default().with_delta(PlayerId::new(0), 12);
        let transition = Transition {
            revision: 4,
            events: vec![
                RoundEvent::TurnResolved { order: 2, result: result.clone() },
                RoundEvent::Escalated(Escalation::SuddenDeath { pair: 1 }),
            ],
        };

        assert_eq!(transition.resolved(), Some(&result));
        assert_eq!(transition.escalation(), Some(&Escalation::SuddenDeath { pair: 1 }));
        assert!(transition.finished().is_none());
    }

    #[test]
    fn test_event_json_round_trip() {
        let event = RoundEvent::TurnOpened {
            order: 1,
            seats: vec![PlayerId::new(0), PlayerId::new(1)],
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: RoundEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
