//! Search-or-pass duel rule set.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EngineResult, GameRng, PlayerId};
use crate::economy::{Ledger, ResourcePool};
use crate::rules::{Advance, Escalation, GameResult, ScoringStrategy, TurnPlan, TurnResult, Viewer};

use super::config::SearchConfig;
use super::pairing::{select_challenger, Pairing, Teams};
use super::scoring::{percent_of, score_duel, DuelSide};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPhase {
    #[default]
    NotStarted,
    /// Entry turn: everyone picks a visa and a token count.
    Choices,
    Duels,
    /// The challenger re-commits a forced-illegal token count.
    Challenge,
    FinalDuel,
    Complete,
}

/// How an entrant pays the visa.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visa {
    /// `visa_percent` of the entrant's own score.
    Percent,
    /// `visa_fixed` from the shared pool.
    Pool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryChoice {
    pub visa: Visa,
    pub tokens: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMove {
    Enter(EntryChoice),
    /// Whether to search the opponent.
    Search(bool),
    /// The challenger's forced-illegal token count.
    Recommit(u32),
}

impl SearchMove {
    #[must_use]
    pub fn enter(visa: Visa, tokens: u32) -> Self {
        SearchMove::Enter(EntryChoice { visa, tokens })
    }
}

/// Public side of a search-duel turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchTable {
    Entry,
    Duel {
        left: PlayerId,
        right: PlayerId,
        final_duel: bool,
    },
    Recommit {
        challenger: PlayerId,
        opponent: PlayerId,
    },
}

impl SearchTable {
    fn kind(&self) -> &'static str {
        match self {
            SearchTable::Entry => "entry",
            SearchTable::Duel { .. } => "duel",
            SearchTable::Recommit { .. } => "re-commit",
        }
    }
}

/// Game information for one viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchSheet {
    pub phase: SearchPhase,
    pub duels: Vec<(PlayerId, PlayerId)>,
    pub unpaired: Option<PlayerId>,
    pub challenger: Option<PlayerId>,
    /// Own post-visa baseline, once entered.
    pub baseline: Option<i64>,
    /// Own net duel delta.
    pub net_delta: Option<i64>,
}

/// A resolved search: `searcher` has seen the count `target` carried into the
/// duel, which is the challenger's re-commit in the final duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Search {
    searcher: PlayerId,
    target: PlayerId,
    recommit: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Entrant {
    player: PlayerId,
    visa: Option<Visa>,
    baseline: Option<i64>,
    net_delta: i64,
}

/// Search-duel strategy for two or more participants.
///
/// The Round opens with one entry turn for everyone, then plays the
/// generated duels one at a time in seat order. An odd roster ends with a
/// challenger re-commit and a forced final duel.
///
/// Token counts stay private: a resolved entry or re-commit is only shown
/// to its owner and to whoever searched the owner in a later duel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDuel {
    config: SearchConfig,
    teams: Teams,
    phase: SearchPhase,
    entrants: Vec<Entrant>,
    pairing: Pairing,
    next_duel: usize,
    challenger: Option<PlayerId>,
    searches: Vec<Search>,
}

impl SearchDuel {
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Put `player` on `team`. Team mates are never paired.
    #[must_use]
    pub fn with_team(mut self, player: PlayerId, team: u16) -> Self {
        self.teams.assign(player, team);
        self
    }

    #[must_use]
    pub fn teams(&self) -> &Teams {
        &self.teams
    }

    /// Duels generated at start.
    #[must_use]
    pub fn pairing(&self) -> &Pairing {
        &self.pairing
    }

    #[must_use]
    pub fn challenger(&self) -> Option<PlayerId> {
        self.challenger
    }

    #[must_use]
    pub fn baseline(&self, player: PlayerId) -> Option<i64> {
        self.entrant(player).ok().and_then(|e| e.baseline)
    }

    #[must_use]
    pub fn net_delta(&self, player: PlayerId) -> Option<i64> {
        self.entrant(player).ok().map(|e| e.net_delta)
    }

    fn entrant(&self, player: PlayerId) -> EngineResult<&Entrant> {
        self.entrants
            .iter()
            .find(|e| e.player == player)
            .ok_or(EngineError::UnknownParticipant(player))
    }

    fn entrant_mut(&mut self, player: PlayerId) -> EngineResult<&mut Entrant> {
        self.entrants
            .iter_mut()
            .find(|e| e.player == player)
            .ok_or(EngineError::UnknownParticipant(player))
    }

    fn duel_plan(left: PlayerId, right: PlayerId, final_duel: bool) -> TurnPlan<SearchTable> {
        TurnPlan::new(
            SearchTable::Duel {
                left,
                right,
                final_duel,
            },
            [left, right],
        )
    }

    fn side(&self, player: PlayerId, searches: Option<bool>, ledger: &Ledger) -> EngineResult<DuelSide> {
        let searches = searches
            .ok_or_else(|| EngineError::Integrity(format!("duel is missing the decision of {player}")))?;
        let baseline = self
            .entrant(player)?
            .baseline
            .ok_or_else(|| EngineError::Integrity(format!("{player} duels without having entered")))?;
        let tokens = ledger.tokens(player)?.unwrap_or(self.config.legal_tokens);
        Ok(DuelSide {
            player,
            baseline,
            tokens,
            searches,
        })
    }

    fn settle_entry(
        &mut self,
        moves: &[(PlayerId, SearchMove)],
        ledger: &Ledger,
        pool: &mut ResourcePool,
    ) -> EngineResult<TurnResult> {
        let mut result = TurnResult::default();
        for &(player, mv) in moves {
            let SearchMove::Enter(choice) = mv else {
                return Err(EngineError::Integrity(format!("{player} holds a non-entry move")));
            };
            let score = ledger.score(player)?;
            let cost = match choice.visa {
                Visa::Percent => percent_of(score.max(0), self.config.visa_percent)?,
                Visa::Pool => {
                    let receipt = pool.spend(self.config.visa_fixed);
                    result.spends.push((player, receipt));
                    i64::try_from(receipt.shortfall())
                        .map_err(|_| EngineError::Integrity("visa shortfall overflows".into()))?
                }
            };
            let baseline = score
                .checked_sub(cost)
                .ok_or_else(|| EngineError::Integrity(format!("baseline overflow for {player}")))?;

            let entrant = self.entrant_mut(player)?;
            entrant.visa = Some(choice.visa);
            entrant.baseline = Some(baseline);
            result = result.with_delta(player, -cost).with_tokens(player, choice.tokens);
        }
        Ok(result)
    }

    fn settle_duel(
        &mut self,
        left: PlayerId,
        right: PlayerId,
        final_duel: bool,
        moves: &[(PlayerId, SearchMove)],
        ledger: &Ledger,
    ) -> EngineResult<TurnResult> {
        let decision = |who: PlayerId| {
            moves.iter().find_map(|&(p, mv)| match mv {
                SearchMove::Search(s) if p == who => Some(s),
                _ => None,
            })
        };
        let left_side = self.side(left, decision(left), ledger)?;
        let right_side = self.side(right, decision(right), ledger)?;
        let (left_out, right_out) = score_duel(&left_side, &right_side, &self.config)?;

        for (searcher, target) in [(&left_side, right), (&right_side, left)] {
            if searcher.searches {
                self.searches.push(Search {
                    searcher: searcher.player,
                    target,
                    recommit: final_duel && self.challenger == Some(target),
                });
            }
        }

        let mut result = TurnResult::default();
        for (player, outcome) in [(left, left_out), (right, right_out)] {
            result = result.with_delta(player, outcome.delta);
            if let Some(tokens) = outcome.tokens {
                result = result.with_tokens(player, tokens);
            }
            self.entrant_mut(player)?.net_delta += outcome.delta;
        }
        Ok(result)
    }

    fn has_searched(&self, viewer: PlayerId, owner: PlayerId, recommit: bool) -> bool {
        self.searches
            .iter()
            .any(|s| s.searcher == viewer && s.target == owner && s.recommit == recommit)
    }

    fn complete(&mut self, ledger: &Ledger) -> Advance<SearchTable> {
        self.phase = SearchPhase::Complete;
        Advance::Finished(GameResult::from_leaders(ledger.leaders()))
    }
}

impl ScoringStrategy for SearchDuel {
    type Config = SearchConfig;
    type Phase = SearchPhase;
    type Move = SearchMove;
    type Table = SearchTable;
    type Sheet = SearchSheet;

    fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn reconfigure(&mut self, config: SearchConfig) -> EngineResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    fn phase(&self) -> SearchPhase {
        self.phase
    }

    fn begin(&mut self, ledger: &Ledger, _rng: &mut GameRng) -> EngineResult<TurnPlan<SearchTable>> {
        self.config.validate()?;
        if ledger.len() < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "a search duel needs at least 2 participants, got {}",
                ledger.len()
            )));
        }

        let seats: Vec<_> = ledger.seats().collect();
        self.pairing = Pairing::generate(&seats, &self.teams)?;
        self.entrants = seats
            .iter()
            .map(|&player| Entrant {
                player,
                visa: None,
                baseline: None,
                net_delta: 0,
            })
            .collect();
        self.phase = SearchPhase::Choices;
        tracing::info!(
            duels = self.pairing.duels.len(),
            unpaired = ?self.pairing.unpaired,
            "search duel pairing generated"
        );
        Ok(TurnPlan::new(SearchTable::Entry, seats))
    }

    fn check(&self, table: &SearchTable, _player: PlayerId, mv: &SearchMove) -> EngineResult<()> {
        match (table, mv) {
            (SearchTable::Entry, SearchMove::Enter(choice)) => self.config.ensure_entering(choice.tokens),
            (SearchTable::Duel { .. }, SearchMove::Search(_)) => Ok(()),
            (SearchTable::Recommit { .. }, SearchMove::Recommit(tokens)) => {
                self.config.ensure_forced_illegal(*tokens)
            }
            (table, mv) => Err(EngineError::InvalidTransition(format!(
                "{mv:?} does not fit a {} turn",
                table.kind()
            ))),
        }
    }

    fn settle(
        &mut self,
        table: &SearchTable,
        moves: &[(PlayerId, SearchMove)],
        ledger: &Ledger,
        pool: &mut ResourcePool,
    ) -> EngineResult<TurnResult> {
        match *table {
            SearchTable::Entry => self.settle_entry(moves, ledger, pool),
            SearchTable::Duel {
                left,
                right,
                final_duel,
            } => self.settle_duel(left, right, final_duel, moves, ledger),
            SearchTable::Recommit { challenger, .. } => match moves {
                [(p, SearchMove::Recommit(tokens))] if *p == challenger => {
                    Ok(TurnResult::default().with_tokens(challenger, *tokens))
                }
                _ => Err(EngineError::Integrity("re-commit turn holds unexpected moves".into())),
            },
        }
    }

    fn advance(&mut self, ledger: &Ledger, _rng: &mut GameRng) -> EngineResult<Advance<SearchTable>> {
        match self.phase {
            SearchPhase::Choices => {
                let (left, right) = *self
                    .pairing
                    .duels
                    .first()
                    .ok_or_else(|| EngineError::Integrity("no duels were generated".into()))?;
                self.phase = SearchPhase::Duels;
                self.next_duel = 1;
                Ok(Advance::Next {
                    plan: Self::duel_plan(left, right, false),
                    escalation: None,
                })
            }
            SearchPhase::Duels => {
                if let Some(&(left, right)) = self.pairing.duels.get(self.next_duel) {
                    self.next_duel += 1;
                    return Ok(Advance::Next {
                        plan: Self::duel_plan(left, right, false),
                        escalation: None,
                    });
                }
                let Some(opponent) = self.pairing.unpaired else {
                    return Ok(self.complete(ledger));
                };

                let candidates: Vec<_> = self
                    .pairing
                    .paired()
                    .map(|p| Ok((p, self.entrant(p)?.net_delta)))
                    .collect::<EngineResult<_>>()?;
                let challenger = select_challenger(candidates, opponent, &self.teams)
                    .ok_or_else(|| EngineError::Integrity(format!("no challenger for {opponent}")))?;
                self.challenger = Some(challenger);
                self.phase = SearchPhase::Challenge;
                tracing::info!(%challenger, %opponent, "challenger selected");
                Ok(Advance::Next {
                    plan: TurnPlan::new(
                        SearchTable::Recommit {
                            challenger,
                            opponent,
                        },
                        [challenger],
                    ),
                    escalation: Some(Escalation::Challenger {
                        challenger,
                        opponent,
                    }),
                })
            }
            SearchPhase::Challenge => {
                let (Some(challenger), Some(opponent)) = (self.challenger, self.pairing.unpaired) else {
                    return Err(EngineError::Integrity("challenge without challenger".into()));
                };
                self.phase = SearchPhase::FinalDuel;
                Ok(Advance::Next {
                    plan: Self::duel_plan(challenger, opponent, true),
                    escalation: Some(Escalation::FinalDuel {
                        challenger,
                        opponent,
                    }),
                })
            }
            SearchPhase::FinalDuel => Ok(self.complete(ledger)),
            SearchPhase::NotStarted | SearchPhase::Complete => Err(EngineError::InvalidTransition(
                format!("cannot advance a search duel in phase {:?}", self.phase),
            )),
        }
    }

    fn reveal(&self, owner: PlayerId, mv: &SearchMove, viewer: Viewer) -> Option<SearchMove> {
        let Viewer::Participant(viewer) = viewer else {
            return match mv {
                SearchMove::Search(_) => Some(*mv),
                _ => None,
            };
        };
        let shown = match mv {
            SearchMove::Search(_) => true,
            SearchMove::Enter(_) => self.has_searched(viewer, owner, false),
            SearchMove::Recommit(_) => self.has_searched(viewer, owner, true),
        };
        shown.then_some(*mv)
    }

    fn sheet(&self, viewer: Viewer) -> SearchSheet {
        let own = match viewer {
            Viewer::Participant(p) => self.entrant(p).ok(),
            Viewer::Spectator => None,
        };
        SearchSheet {
            phase: self.phase,
            duels: self.pairing.duels.clone(),
            unpaired: self.pairing.unpaired,
            challenger: self.challenger,
            baseline: own.and_then(|e| e.baseline),
            net_delta: own.map(|e| e.net_delta),
        }
    }
}
