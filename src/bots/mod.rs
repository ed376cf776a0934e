//! Automated participants.
//!
//! A bot reads the same redacted `RoundView` a human client gets and
//! answers with a move through the public `submit` path. The engine cannot
//! tell it apart from a human caller.

mod guess;
mod search;

pub use guess::GuessBot;
pub use search::SearchBot;

use crate::core::{EngineResult, PlayerId};
use crate::rules::{RoundView, ScoringStrategy, Transition, Viewer};
use crate::runtime::RoundHandle;

/// Decision logic of an automated participant.
pub trait Bot<S: ScoringStrategy>: Send {
    /// The seat this bot plays.
    fn seat(&self) -> PlayerId;

    /// Pick a commitment for the current turn, or `None` to wait.
    fn decide(&mut self, view: &RoundView<S>) -> Option<S::Move>;
}

/// Submit the bot's move if its seat is awaited in the current turn.
///
/// Returns `Ok(None)` when there was nothing to do.
pub async fn act<S, B>(bot: &mut B, handle: &RoundHandle<S>) -> EngineResult<Option<Transition>>
where
    S: ScoringStrategy,
    B: Bot<S> + ?Sized,
{
    let seat = bot.seat();
    let view = handle.view(Viewer::Participant(seat)).await?;
    if !view.awaits(seat) {
        return Ok(None);
    }
    match bot.decide(&view) {
        Some(mv) => handle.submit(seat, mv).await.map(Some),
        None => Ok(None),
    }
}
