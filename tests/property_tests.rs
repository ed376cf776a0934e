//! Property tests: pool floor, deck conservation, percent rounding.

use duel_rounds::bots::{Bot, GuessBot};
use duel_rounds::core::{PlayerId, RoundOptions};
use duel_rounds::economy::ResourcePool;
use duel_rounds::games::guess::{GuessConfig, GuessDuel};
use duel_rounds::games::search::percent_of;
use duel_rounds::rules::{EngineStatus, RoundBuilder, RoundEngine, Viewer};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Play a guess round between bots until it finishes or `max_turns` pass.
fn play_out(seed: u64, turns_per_role: u32, max_turns: usize) -> RoundEngine<GuessDuel> {
    let mut round = RoundBuilder::new()
        .seats(2, 0)
        .options(RoundOptions::default().with_seed(seed))
        .build(GuessDuel::new(GuessConfig::default().with_turns_per_role(turns_per_role)))
        .unwrap();
    round.start().unwrap();
    let mut bots = [
        GuessBot::new(PlayerId::new(0), seed.wrapping_add(1)),
        GuessBot::new(PlayerId::new(1), seed.wrapping_add(2)),
    ];

    while round.turns().count() <= max_turns {
        for bot in &mut bots {
            let view = round.view(Viewer::Participant(bot.seat()));
            if view.awaits(bot.seat()) {
                let mv = bot.decide(&view).unwrap();
                round.submit(bot.seat(), mv).unwrap();
            }
        }
        match round.status() {
            EngineStatus::Open { .. } => {
                round.resolve().unwrap();
            }
            EngineStatus::Resolved { .. } => {
                round.advance().unwrap();
            }
            EngineStatus::Finished | EngineStatus::NotStarted => break,
        }
    }
    round
}

fn has_duplicates(values: &[u8]) -> bool {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).any(|w| w[0] == w[1])
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// `spent` never passes `initial × (100 − floor) / 100`.
    #[test]
    fn prop_pool_never_below_floor(
        initial in 0u64..100_000,
        floor in 0u8..=100,
        spends in prop::collection::vec(0u64..20_000, 0..40),
    ) {
        let mut pool = ResourcePool::new(initial, floor);
        let cap = initial * u64::from(100 - floor) / 100;
        let mut total = 0;

        for amount in spends {
            let receipt = pool.spend(amount);
            prop_assert!(receipt.actual <= amount);
            prop_assert_eq!(receipt.capped, receipt.actual < amount);
            total += receipt.actual;
            prop_assert!(pool.spent() <= cap);
            prop_assert!(pool.is_consistent());
        }
        prop_assert_eq!(pool.spent(), total);
    }

    /// Played and remaining cards partition every deck and hand.
    #[test]
    fn prop_deck_conservation(seed in any::<u64>(), turns_per_role in 1u32..=11) {
        let round = play_out(seed, turns_per_role, 200);
        let duel = round.strategy();
        let full: Vec<u8> = (1..=11).collect();

        for seat in PlayerId::all(2) {
            for deck in [duel.dealer_deck(seat).unwrap(), duel.hand(seat).unwrap()] {
                prop_assert_eq!(deck.contents(), full.clone());
                prop_assert!(!has_duplicates(deck.played()));
            }
        }
        for deck in duel.retired() {
            prop_assert_eq!(deck.contents(), full.clone());
            prop_assert!(deck.is_empty());
        }
    }

    /// Every turn ends with one resolved result, and only the last may be open.
    #[test]
    fn prop_turns_resolve_once(seed in any::<u64>()) {
        let round = play_out(seed, 3, 60);
        let count = round.turns().count();
        for (i, turn) in round.turns().enumerate() {
            prop_assert_eq!(turn.order() as usize, i + 1);
            if i + 1 < count {
                prop_assert!(turn.is_resolved());
            }
            prop_assert_eq!(turn.is_resolved(), turn.result().is_some());
        }
        prop_assert!(round.verify().is_ok());
    }

    /// Rounding error of `percent_of` stays within half a point.
    #[test]
    fn prop_percent_rounding(base in -1_000_000i64..1_000_000, percent in -300i64..300) {
        let exact = i128::from(base) * i128::from(percent);
        let rounded = i128::from(percent_of(base, percent).unwrap()) * 100;
        prop_assert!((rounded - exact).abs() <= 50);
    }
}
