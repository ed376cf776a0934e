//! Engine error kinds.
//!
//! Guard violations are recoverable: the caller (a UI or a bot) corrects its
//! input or waits. Only `Integrity`, `Frozen` and `Store` are not.

use thiserror::Error;

use super::player::PlayerId;

/// Errors raised by persistence backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot codec failed: {0}")]
    Codec(#[from] bincode::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("no snapshot stored for round {0}")]
    Missing(uuid::Uuid),
}

/// Errors returned by Round operations.
///
/// Every operation is all-or-nothing: when one of these is returned the
/// Round is exactly as it was before the call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Operation not legal in the current state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("{0} has already locked a commitment this turn")]
    AlreadyLocked(PlayerId),

    /// Turn was already resolved; retrying is a no-op.
    #[error("turn {order} is already resolved")]
    AlreadyResolved { order: u32 },

    #[error("turn {order} still waits for {waiting} commitment(s)")]
    NotAllLocked { order: u32, waiting: usize },

    #[error("turn {order} is not resolved yet")]
    NotResolved { order: u32 },

    /// Reset refused because the turn has been resolved.
    #[error("turn {order} is resolved and can no longer be reset")]
    TurnAlreadyResolved { order: u32 },

    /// Submission landed after the turn closed.
    #[error("turn {order} is closed to submissions")]
    TurnClosed { order: u32 },

    #[error("{0} holds no role in the current turn")]
    UnknownParticipant(PlayerId),

    /// Token count or card value outside the allowed domain.
    #[error("{what} = {value} is outside {min}..={max}")]
    OutOfRange {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A hidden commitment was read before the turn resolved.
    #[error("commitment of {0} is concealed until the turn resolves")]
    Concealed(PlayerId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Persisted or in-memory state violates a Round invariant.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("round is frozen: {0}")]
    Frozen(String),

    /// The actor owning the Round has stopped.
    #[error("round is closed")]
    RoundClosed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Build an `OutOfRange` error from any integer-like values.
    pub fn out_of_range(
        what: &'static str,
        value: impl Into<i64>,
        min: impl Into<i64>,
        max: impl Into<i64>,
    ) -> Self {
        EngineError::OutOfRange {
            what,
            value: value.into(),
            min: min.into(),
            max: max.into(),
        }
    }

    /// True when the failed call changed nothing and needs no follow-up.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, EngineError::AlreadyResolved { .. })
    }

    /// False for conditions that need an operator.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            EngineError::Integrity(_) | EngineError::Frozen(_) | EngineError::Store(_)
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
