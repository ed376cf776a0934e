//! The task that owns one Round and applies its commands in order.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use crate::core::EngineResult;
use crate::rules::{RoundEngine, ScoringStrategy, Transition};

use super::handle::RoundHandle;
use super::message::{Command, Notice};
use super::store::RoundStore;

const NOTICE_CAPACITY: usize = 256;

/// Single writer of one Round.
///
/// - Handles queue commands on an unbounded channel
/// - The actor applies them one at a time against a draft
/// - The draft is saved to the store, then replaces the live Round
/// - Each event of the transition is broadcast as a `Notice`
pub(crate) struct RoundActor<S: ScoringStrategy> {
    round: RoundEngine<S>,
    store: Arc<dyn RoundStore>,
    commands: UnboundedReceiver<Command<S>>,
    notices: broadcast::Sender<Notice>,
}

impl<S: ScoringStrategy> RoundActor<S> {
    pub(crate) fn spawn(round: RoundEngine<S>, store: Arc<dyn RoundStore>) -> RoundHandle<S> {
        let (tx, rx) = unbounded_channel();
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let handle = RoundHandle::new(round.id(), tx, notices.clone());
        let actor = Self {
            round,
            store,
            commands: rx,
            notices,
        };
        tokio::spawn(actor.run());
        handle
    }

    async fn run(mut self) {
        tracing::debug!(round = %self.round.id(), "actor started");
        while let Some(command) = self.commands.recv().await {
            tracing::trace!(round = %self.round.id(), command = command.name(), "received");
            self.handle(command);
        }
        tracing::debug!(round = %self.round.id(), "actor stopped, all handles dropped");
    }

    fn handle(&mut self, command: Command<S>) {
        match command {
            Command::Reconfigure { config, reply } => {
                let _ = reply.send(self.apply(|r| r.reconfigure(config)));
            }
            Command::Start { reply } => {
                let _ = reply.send(self.apply(RoundEngine::start));
            }
            Command::Submit { player, mv, reply } => {
                let _ = reply.send(self.apply(|r| r.submit(player, mv)));
            }
            Command::Resolve { reply } => {
                let _ = reply.send(self.apply(RoundEngine::resolve));
            }
            Command::Advance { reply } => {
                let _ = reply.send(self.apply(RoundEngine::advance));
            }
            Command::Reset { players, reply } => {
                let _ = reply.send(self.apply(|r| r.reset(&players)));
            }
            Command::View { viewer, reply } => {
                let _ = reply.send(self.round.view(viewer));
            }
        }
    }

    fn apply(
        &mut self,
        op: impl FnOnce(&mut RoundEngine<S>) -> EngineResult<Transition>,
    ) -> EngineResult<Transition> {
        let mut draft = self.round.clone();
        let transition = match op(&mut draft) {
            Ok(transition) => transition,
            Err(err) => {
                if draft.frozen().is_some() && self.round.frozen().is_none() {
                    self.adopt_frozen(draft);
                }
                return Err(err);
            }
        };

        let snapshot = draft.snapshot()?;
        self.store.save(draft.id(), &snapshot)?;
        self.round = draft;

        for event in &transition.events {
            // No subscribers is fine.
            let _ = self.notices.send(Notice {
                round: self.round.id(),
                revision: transition.revision,
                event: event.clone(),
            });
        }
        Ok(transition)
    }

    fn adopt_frozen(&mut self, draft: RoundEngine<S>) {
        match draft.snapshot().map(|bytes| self.store.save(draft.id(), &bytes)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) | Err(err) => {
                tracing::error!(round = %draft.id(), %err, "could not persist frozen round");
            }
        }
        self.round = draft;
    }
}
