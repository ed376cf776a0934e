//! Messages exchanged with a Round actor.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::core::{EngineResult, PlayerId};
use crate::rules::{RoundEvent, RoundId, RoundView, ScoringStrategy, Transition, Viewer};

pub(crate) type Reply<T> = oneshot::Sender<EngineResult<T>>;

/// A request for the actor, carrying its reply channel.
pub(crate) enum Command<S: ScoringStrategy> {
    Reconfigure { config: S::Config, reply: Reply<Transition> },
    Start { reply: Reply<Transition> },
    Submit { player: PlayerId, mv: S::Move, reply: Reply<Transition> },
    Resolve { reply: Reply<Transition> },
    Advance { reply: Reply<Transition> },
    Reset { players: Vec<PlayerId>, reply: Reply<Transition> },
    View { viewer: Viewer, reply: oneshot::Sender<RoundView<S>> },
}

impl<S: ScoringStrategy> Command<S> {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Command::Reconfigure { .. } => "reconfigure",
            Command::Start { .. } => "start",
            Command::Submit { .. } => "submit",
            Command::Resolve { .. } => "resolve",
            Command::Advance { .. } => "advance",
            Command::Reset { .. } => "reset",
            Command::View { .. } => "view",
        }
    }
}

/// State-changed notification broadcast after every committed operation.
///
/// Carries no commitment values before their turn resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub round: RoundId,
    pub revision: u64,
    pub event: RoundEvent,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[round {} r{}] {}", self.round, self.revision, self.event)
    }
}
