//! Player accounts and the per-round ledger.
//!
//! Accounts are created when a participant joins and are only mutated by
//! the engine applying a `TurnResult`. They are never removed mid-round.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EngineResult, PlayerId, PlayerMap};

/// A participant's score and optional token balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Points of victory.
    pub score: i64,
    /// Token balance; `None` for games without tokens.
    pub tokens: Option<u32>,
}

impl Account {
    #[must_use]
    pub fn new(score: i64) -> Self {
        Self {
            score,
            tokens: None,
        }
    }
}

/// All accounts of one Round, indexed by seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    accounts: PlayerMap<Account>,
}

impl Ledger {
    /// One account per starting score, in seat order.
    #[must_use]
    pub fn new(starting_scores: &[i64]) -> Self {
        Self {
            accounts: PlayerMap::from_vec(starting_scores.iter().map(|&s| Account::new(s)).collect()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn seats(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.accounts.seats()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &Account)> {
        self.accounts.iter()
    }

    pub fn account(&self, player: PlayerId) -> EngineResult<&Account> {
        self.accounts
            .get(player)
            .ok_or(EngineError::UnknownParticipant(player))
    }

    pub fn score(&self, player: PlayerId) -> EngineResult<i64> {
        Ok(self.account(player)?.score)
    }

    pub fn tokens(&self, player: PlayerId) -> EngineResult<Option<u32>> {
        Ok(self.account(player)?.tokens)
    }

    /// Add `delta` to a score.
    pub fn credit(&mut self, player: PlayerId, delta: i64) -> EngineResult<()> {
        let account = self
            .accounts
            .get_mut(player)
            .ok_or(EngineError::UnknownParticipant(player))?;
        account.score = account
            .score
            .checked_add(delta)
            .ok_or_else(|| EngineError::Integrity(format!("score overflow for {player}")))?;
        Ok(())
    }

    pub fn set_tokens(&mut self, player: PlayerId, tokens: u32) -> EngineResult<()> {
        let account = self
            .accounts
            .get_mut(player)
            .ok_or(EngineError::UnknownParticipant(player))?;
        account.tokens = Some(tokens);
        Ok(())
    }

    /// Seats holding the highest score.
    #[must_use]
    pub fn leaders(&self) -> Vec<PlayerId> {
        let Some(best) = self.accounts.iter().map(|(_, a)| a.score).max() else {
            return Vec::new();
        };
        self.accounts
            .iter()
            .filter(|(_, a)| a.score == best)
            .map(|(p, _)| p)
            .collect()
    }
}
