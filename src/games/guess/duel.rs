//! Guess-duel rule set.

use serde::{Deserialize, Serialize};

use crate::cards::{CardValue, Deck};
use crate::core::{EngineError, EngineResult, GameRng, PlayerId};
use crate::economy::{Ledger, ResourcePool};
use crate::rules::{Advance, Escalation, GameResult, ScoringStrategy, TurnPlan, TurnResult, Viewer};

use super::config::GuessConfig;
use super::scoring::{score_turn, Guess};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessPhase {
    #[default]
    NotStarted,
    Running,
    SuddenDeath,
    Finished,
}

/// A commitment: the active plays a card, the guesser calls it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessMove {
    Play(CardValue),
    Guess(Guess),
}

/// Public side of a turn. The dealer card is face up from the start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessTable {
    pub active: PlayerId,
    pub guesser: PlayerId,
    pub dealer: CardValue,
    /// Set for turns played in sudden death.
    pub sudden_death_pair: Option<u32>,
}

/// Game information for one viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessSheet {
    pub phase: GuessPhase,
    pub turns_played: u32,
    pub fixed_turns: u32,
    /// The viewer's own hand, ascending. `None` for spectators.
    pub hand: Option<Vec<CardValue>>,
    /// Cards left in each seat's dealer deck (counts only).
    pub dealer_cards_left: Vec<(PlayerId, usize)>,
    pub sudden_death_pair: Option<u32>,
}

/// Guess-duel strategy for exactly two participants.
///
/// Each seat owns a dealer deck (drawn while that seat is active) and a hand.
/// Seat 0 is active on odd turns. When a deck or hand runs dry at turn open,
/// a fresh shuffled one replaces it and the old one is retired.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GuessDuel {
    config: GuessConfig,
    phase: GuessPhase,
    seats: Vec<PlayerId>,
    dealer_decks: Vec<Deck>,
    hands: Vec<Deck>,
    retired: Vec<Deck>,
    turns_played: u32,
    pair: u32,
    pair_turns: u32,
    pair_gains: [i64; 2],
}

impl GuessDuel {
    #[must_use]
    pub fn new(config: GuessConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    /// Current sudden-death pair, 0 outside sudden death.
    #[must_use]
    pub fn sudden_death_pair(&self) -> u32 {
        self.pair
    }

    #[must_use]
    pub fn dealer_deck(&self, player: PlayerId) -> Option<&Deck> {
        self.dealer_decks.iter().find(|d| d.owner() == player)
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> Option<&Deck> {
        self.hands.iter().find(|d| d.owner() == player)
    }

    /// Exhausted decks and hands replaced during sudden death.
    #[must_use]
    pub fn retired(&self) -> &[Deck] {
        &self.retired
    }

    fn seat_index(&self, player: PlayerId) -> EngineResult<usize> {
        self.seats
            .iter()
            .position(|&p| p == player)
            .ok_or(EngineError::UnknownParticipant(player))
    }

    /// Open the next turn with `seats[active]` as the active role.
    fn open_turn(&mut self, active: usize, rng: &mut GameRng) -> EngineResult<TurnPlan<GuessTable>> {
        let (low, high) = (self.config.card_low, self.config.card_high);
        let owner = self.seats[active];

        if self.dealer_decks[active].is_empty() {
            let fresh = Deck::shuffled(owner, low, high, rng);
            self.retired.push(std::mem::replace(&mut self.dealer_decks[active], fresh));
        }
        if self.hands[active].is_empty() {
            let fresh = Deck::with_range(owner, low, high);
            self.retired.push(std::mem::replace(&mut self.hands[active], fresh));
        }

        let dealer = self.dealer_decks[active]
            .draw()
            .ok_or_else(|| EngineError::Integrity(format!("dealer deck of {owner} is empty")))?;
        let guesser = self.seats[1 - active];
        let sudden_death_pair = (self.phase == GuessPhase::SuddenDeath).then_some(self.pair);

        Ok(TurnPlan::new(
            GuessTable {
                active: owner,
                guesser,
                dealer,
                sudden_death_pair,
            },
            [owner, guesser],
        ))
    }

    fn start_pair(&mut self, rng: &mut GameRng) -> EngineResult<Advance<GuessTable>> {
        self.phase = GuessPhase::SuddenDeath;
        self.pair += 1;
        self.pair_turns = 0;
        self.pair_gains = [0, 0];
        let plan = self.open_turn(0, rng)?;
        Ok(Advance::Next {
            plan,
            escalation: Some(Escalation::SuddenDeath { pair: self.pair }),
        })
    }

    fn finish(&mut self, winner: PlayerId) -> Advance<GuessTable> {
        self.phase = GuessPhase::Finished;
        Advance::Finished(GameResult::Winner(winner))
    }
}

impl ScoringStrategy for GuessDuel {
    type Config = GuessConfig;
    type Phase = GuessPhase;
    type Move = GuessMove;
    type Table = GuessTable;
    type Sheet = GuessSheet;

    fn config(&self) -> &GuessConfig {
        &self.config
    }

    fn reconfigure(&mut self, config: GuessConfig) -> EngineResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    fn phase(&self) -> GuessPhase {
        self.phase
    }

    fn begin(&mut self, ledger: &Ledger, rng: &mut GameRng) -> EngineResult<TurnPlan<GuessTable>> {
        self.config.validate()?;
        if ledger.len() != 2 {
            return Err(EngineError::InvalidConfig(format!(
                "a guess duel needs exactly 2 participants, got {}",
                ledger.len()
            )));
        }

        let (low, high) = (self.config.card_low, self.config.card_high);
        self.seats = ledger.seats().collect();
        self.dealer_decks = self
            .seats
            .iter()
            .map(|&p| Deck::shuffled(p, low, high, rng))
            .collect();
        self.hands = self
            .seats
            .iter()
            .map(|&p| Deck::with_range(p, low, high))
            .collect();
        self.phase = GuessPhase::Running;
        self.open_turn(0, rng)
    }

    fn check(&self, table: &GuessTable, player: PlayerId, mv: &GuessMove) -> EngineResult<()> {
        match (mv, player) {
            (GuessMove::Play(card), p) if p == table.active => {
                let hand = self
                    .hand(p)
                    .ok_or(EngineError::UnknownParticipant(p))?;
                hand.ensure_holds(*card)
            }
            (GuessMove::Guess(_), p) if p == table.guesser => Ok(()),
            (GuessMove::Play(_), p) if p == table.guesser => Err(EngineError::InvalidTransition(
                format!("{p} is the guesser this turn and must guess"),
            )),
            (GuessMove::Guess(_), p) if p == table.active => Err(EngineError::InvalidTransition(
                format!("{p} is active this turn and must play a card"),
            )),
            (_, p) => Err(EngineError::UnknownParticipant(p)),
        }
    }

    fn settle(
        &mut self,
        table: &GuessTable,
        moves: &[(PlayerId, GuessMove)],
        _ledger: &Ledger,
        _pool: &mut ResourcePool,
    ) -> EngineResult<TurnResult> {
        let mut played = None;
        let mut guess = None;
        for (player, mv) in moves {
            match mv {
                GuessMove::Play(card) if *player == table.active => played = Some(*card),
                GuessMove::Guess(g) if *player == table.guesser => guess = Some(*g),
                _ => {
                    return Err(EngineError::Integrity(format!(
                        "{player} holds a commitment that does not fit its role"
                    )))
                }
            }
        }
        let (Some(played), Some(guess)) = (played, guess) else {
            return Err(EngineError::Integrity("turn is missing a role's commitment".into()));
        };

        let active = self.seat_index(table.active)?;
        let guesser = self.seat_index(table.guesser)?;
        self.hands[active].take(played)?;

        let score = score_turn(table.dealer, played, guess, &self.config)?;
        self.turns_played += 1;
        if self.phase == GuessPhase::SuddenDeath {
            self.pair_turns += 1;
            for (seat, gain) in [(active, score.active), (guesser, score.guesser)] {
                self.pair_gains[seat] = self.pair_gains[seat]
                    .checked_add(gain)
                    .ok_or_else(|| EngineError::Integrity("sudden-death gains overflow".into()))?;
            }
        }

        Ok(TurnResult::default()
            .with_delta(table.guesser, score.guesser)
            .with_delta(table.active, score.active))
    }

    fn advance(&mut self, ledger: &Ledger, rng: &mut GameRng) -> EngineResult<Advance<GuessTable>> {
        match self.phase {
            GuessPhase::Running if self.turns_played < self.config.fixed_turns() => {
                let active = (self.turns_played % 2) as usize;
                Ok(Advance::Next {
                    plan: self.open_turn(active, rng)?,
                    escalation: None,
                })
            }
            GuessPhase::Running => {
                let first = ledger.score(self.seats[0])?;
                let second = ledger.score(self.seats[1])?;
                match first.cmp(&second) {
                    std::cmp::Ordering::Greater => Ok(self.finish(self.seats[0])),
                    std::cmp::Ordering::Less => Ok(self.finish(self.seats[1])),
                    std::cmp::Ordering::Equal => {
                        tracing::info!(score = first, "scores tied after fixed turns");
                        self.start_pair(rng)
                    }
                }
            }
            GuessPhase::SuddenDeath if self.pair_turns < 2 => {
                let active = self.pair_turns as usize;
                Ok(Advance::Next {
                    plan: self.open_turn(active, rng)?,
                    escalation: None,
                })
            }
            GuessPhase::SuddenDeath => match self.pair_gains[0].cmp(&self.pair_gains[1]) {
                std::cmp::Ordering::Greater => Ok(self.finish(self.seats[0])),
                std::cmp::Ordering::Less => Ok(self.finish(self.seats[1])),
                std::cmp::Ordering::Equal => self.start_pair(rng),
            },
            GuessPhase::NotStarted | GuessPhase::Finished => Err(EngineError::InvalidTransition(
                format!("cannot advance a guess duel in phase {:?}", self.phase),
            )),
        }
    }

    fn sheet(&self, viewer: Viewer) -> GuessSheet {
        let hand = match viewer {
            Viewer::Participant(p) => self.hand(p).map(|h| {
                let mut cards = h.remaining().to_vec();
                cards.sort_unstable();
                cards
            }),
            Viewer::Spectator => None,
        };

        GuessSheet {
            phase: self.phase,
            turns_played: self.turns_played,
            fixed_turns: self.config.fixed_turns(),
            hand,
            dealer_cards_left: self.dealer_decks.iter().map(|d| (d.owner(), d.len())).collect(),
            sudden_death_pair: (self.phase == GuessPhase::SuddenDeath).then_some(self.pair),
        }
    }
}
