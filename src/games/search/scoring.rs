//! Pure search-duel scoring.
//!
//! Both directions of a duel are scored independently. A participant's
//! percentages from both directions are summed and applied once to their
//! fixed post-visa baseline.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EngineResult, PlayerId};

use super::config::SearchConfig;

/// `base × percent / 100`, rounded half away from zero.
///
/// ```
/// use duel_rounds::games::search::percent_of;
///
/// assert_eq!(percent_of(200, 50).unwrap(), 100);
/// assert_eq!(percent_of(15, 10).unwrap(), 2);
/// assert_eq!(percent_of(-15, 10).unwrap(), -2);
/// ```
pub fn percent_of(base: i64, percent: i64) -> EngineResult<i64> {
    let product = i128::from(base) * i128::from(percent);
    let mut quotient = product / 100;
    if (product % 100).abs() * 2 >= 100 {
        quotient += product.signum();
    }
    i64::try_from(quotient)
        .map_err(|_| EngineError::Integrity(format!("{percent}% of {base} overflows")))
}

/// One participant's side of a duel, as revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DuelSide {
    pub player: PlayerId,
    /// Post-visa baseline; negative baselines score as zero.
    pub baseline: i64,
    /// Tokens currently carried.
    pub tokens: u32,
    pub searches: bool,
}

/// Percent changes caused by one side's decision about the other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Direction {
    pub searcher: i64,
    pub target: i64,
    /// Target's illegal tokens are taken away.
    pub confiscated: bool,
}

/// Score one direction: `searches` is the decision made about a target
/// holding `illegal` illegal tokens.
#[must_use]
pub fn score_direction(searches: bool, illegal: u32, config: &SearchConfig) -> Direction {
    let k = i64::from(illegal);
    match (searches, illegal) {
        (true, 0) => Direction {
            searcher: -config.loss_search_no_illegal,
            ..Direction::default()
        },
        (true, _) => Direction {
            searcher: k * config.gain_per_illegal_found,
            target: -(k * config.loss_per_illegal_caught),
            confiscated: true,
        },
        (false, 0) => Direction::default(),
        (false, _) => Direction {
            target: k * config.gain_per_illegal_passed,
            ..Direction::default()
        },
    }
}

/// Scored outcome of a duel, per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideOutcome {
    /// Net percent applied to the baseline.
    pub percent: i64,
    /// Score delta in points.
    pub delta: i64,
    /// New token balance when tokens were confiscated.
    pub tokens: Option<u32>,
}

/// Score a full duel.
pub fn score_duel(
    left: &DuelSide,
    right: &DuelSide,
    config: &SearchConfig,
) -> EngineResult<(SideOutcome, SideOutcome)> {
    let left_on_right = score_direction(left.searches, config.illegal(right.tokens), config);
    let right_on_left = score_direction(right.searches, config.illegal(left.tokens), config);

    let side = |me: &DuelSide, mine: Direction, theirs: Direction| -> EngineResult<SideOutcome> {
        let percent = mine.searcher + theirs.target;
        Ok(SideOutcome {
            percent,
            delta: percent_of(me.baseline.max(0), percent)?,
            tokens: theirs.confiscated.then_some(config.legal_tokens),
        })
    };

    Ok((
        side(left, left_on_right, right_on_left)?,
        side(right, right_on_left, left_on_right)?,
    ))
}
