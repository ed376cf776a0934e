//! Async client side of a Round actor.

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{broadcast, oneshot};

use crate::core::{EngineError, EngineResult, PlayerId};
use crate::rules::{RoundId, RoundView, ScoringStrategy, Transition, Viewer};

use super::message::{Command, Notice, Reply};

/// Cloneable front door to a running Round.
///
/// Calls never block on other participants: each one is queued to the
/// Round's actor and answered as soon as it has been applied.
#[derive(Clone)]
pub struct RoundHandle<S: ScoringStrategy> {
    id: RoundId,
    commands: UnboundedSender<Command<S>>,
    notices: broadcast::Sender<Notice>,
}

impl<S: ScoringStrategy> std::fmt::Debug for RoundHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundHandle")
            .field("id", &self.id)
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

impl<S: ScoringStrategy> RoundHandle<S> {
    pub(crate) fn new(
        id: RoundId,
        commands: UnboundedSender<Command<S>>,
        notices: broadcast::Sender<Notice>,
    ) -> Self {
        Self {
            id,
            commands,
            notices,
        }
    }

    #[must_use]
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// Receive every `Notice` committed after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub async fn reconfigure(&self, config: S::Config) -> EngineResult<Transition> {
        self.request(|reply| Command::Reconfigure { config, reply }).await
    }

    pub async fn start(&self) -> EngineResult<Transition> {
        self.request(|reply| Command::Start { reply }).await
    }

    pub async fn submit(&self, player: PlayerId, mv: S::Move) -> EngineResult<Transition> {
        self.request(|reply| Command::Submit { player, mv, reply }).await
    }

    pub async fn resolve(&self) -> EngineResult<Transition> {
        self.request(|reply| Command::Resolve { reply }).await
    }

    pub async fn advance(&self) -> EngineResult<Transition> {
        self.request(|reply| Command::Advance { reply }).await
    }

    /// Clear slots of the current turn; an empty list clears all of them.
    pub async fn reset(&self, players: Vec<PlayerId>) -> EngineResult<Transition> {
        self.request(|reply| Command::Reset { players, reply }).await
    }

    pub async fn view(&self, viewer: Viewer) -> EngineResult<RoundView<S>> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::View { viewer, reply: tx })
            .map_err(|_| EngineError::RoundClosed)?;
        rx.await.map_err(|_| EngineError::RoundClosed)
    }

    async fn request(&self, command: impl FnOnce(Reply<Transition>) -> Command<S>) -> EngineResult<Transition> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .map_err(|_| EngineError::RoundClosed)?;
        rx.await.map_err(|_| EngineError::RoundClosed)?
    }
}
