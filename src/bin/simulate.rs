//! Play full Rounds between bots through the actor runtime.
//!
//! ```text
//! simulate guess --seed 7
//! RUST_LOG=debug simulate search --players 5 --rounds 3
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duel_rounds::bots::{self, Bot, GuessBot, SearchBot};
use duel_rounds::games::guess::{GuessConfig, GuessDuel};
use duel_rounds::games::search::{SearchConfig, SearchDuel};
use duel_rounds::{
    EngineError, EngineResult, EngineStatus, GameResult, Lobby, MemoryStore, PlayerId, PoolConfig,
    RoundBuilder, RoundHandle, RoundOptions, RoundStore, ScoringStrategy, Viewer,
};

#[derive(Parser)]
#[command(name = "simulate")]
#[command(about = "Simulate hidden-commitment duels between bots", long_about = None)]
struct Cli {
    /// Base RNG seed; round `i` uses `seed + i`
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of rounds to play
    #[arg(short, long, default_value_t = 1)]
    rounds: u64,

    /// Starting score of every participant
    #[arg(long, default_value_t = 100)]
    score: i64,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    game: Game,
}

#[derive(Subcommand)]
enum Game {
    /// Two-player guess-the-card duel
    Guess {
        /// Turns per active role before sudden death
        #[arg(long, default_value_t = 11)]
        turns_per_role: u32,

        /// Reward multiplier for a correct direction
        #[arg(long, default_value_t = 2)]
        multiplier: i64,
    },
    /// Search-or-pass duel
    Search {
        #[arg(short, long, default_value_t = 4)]
        players: u8,

        /// Shared pool fund
        #[arg(long, default_value_t = 1_000)]
        pool: u64,

        /// Percentage of the pool that can never be spent
        #[arg(long, default_value_t = 20)]
        floor: u8,
    },
}

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let store: Arc<dyn RoundStore> = Arc::new(MemoryStore::new());

    match cli.game {
        Game::Guess {
            turns_per_role,
            multiplier,
        } => {
            let lobby = Lobby::<GuessDuel>::new(Arc::clone(&store));
            let config = GuessConfig::default()
                .with_turns_per_role(turns_per_role)
                .with_correct_multiplier(multiplier);
            for i in 0..cli.rounds {
                let seed = cli.seed.wrapping_add(i);
                let round = RoundBuilder::new()
                    .seats(2, cli.score)
                    .options(RoundOptions::default().with_seed(seed))
                    .build(GuessDuel::new(config.clone()))?;
                let handle = lobby.open(round).await?;
                let mut seats: Vec<Box<dyn Bot<GuessDuel>>> = PlayerId::all(2)
                    .map(|p| Box::new(GuessBot::new(p, seed ^ (u64::from(p.0) << 32))) as Box<dyn Bot<GuessDuel>>)
                    .collect();
                let result = play(&handle, &mut seats).await?;
                report(&handle, &result).await?;
            }
        }
        Game::Search {
            players,
            pool,
            floor,
        } => {
            let lobby = Lobby::<SearchDuel>::new(Arc::clone(&store));
            for i in 0..cli.rounds {
                let seed = cli.seed.wrapping_add(i);
                let options = RoundOptions::default()
                    .with_seed(seed)
                    .with_pool(PoolConfig::new(pool, floor));
                let round = RoundBuilder::new()
                    .seats(usize::from(players), cli.score)
                    .options(options)
                    .build(SearchDuel::new(SearchConfig::default()))?;
                let handle = lobby.open(round).await?;
                let mut seats: Vec<Box<dyn Bot<SearchDuel>>> = PlayerId::all(usize::from(players))
                    .map(|p| Box::new(SearchBot::new(p, seed ^ (u64::from(p.0) << 32))) as Box<dyn Bot<SearchDuel>>)
                    .collect();
                let result = play(&handle, &mut seats).await?;
                report(&handle, &result).await?;
            }
        }
    }
    Ok(())
}

/// Drive one Round to its end, acting as operator between bot moves.
async fn play<S: ScoringStrategy>(
    handle: &RoundHandle<S>,
    players: &mut [Box<dyn Bot<S>>],
) -> EngineResult<GameResult> {
    let mut notices = handle.subscribe();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            tracing::debug!("{notice}");
        }
    });

    handle.start().await?;
    loop {
        for bot in players.iter_mut() {
            bots::act(bot.as_mut(), handle).await?;
        }
        let view = handle.view(Viewer::Spectator).await?;
        match view.status {
            EngineStatus::Open { .. } => {
                handle.resolve().await?;
            }
            EngineStatus::Resolved { .. } => {
                handle.advance().await?;
            }
            EngineStatus::Finished => {
                return view
                    .result
                    .ok_or_else(|| EngineError::Integrity("finished without a result".into()));
            }
            EngineStatus::NotStarted => {
                return Err(EngineError::InvalidTransition("round did not start".into()));
            }
        }
    }
}

async fn report<S: ScoringStrategy>(handle: &RoundHandle<S>, result: &GameResult) -> EngineResult<()> {
    let view = handle.view(Viewer::Spectator).await?;
    let scores = view
        .accounts
        .iter()
        .map(|a| format!("{}={}", a.player, a.score))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::info!(
        round = %handle.id(),
        turns = view.history.len() + 1,
        pool_spent = view.pool.spent,
        ?result,
        "{scores}"
    );
    Ok(())
}
