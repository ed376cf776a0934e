//! Round actors: serialized access, persistence and broadcast.

use std::sync::Arc;

use duel_rounds::bots::{self, SearchBot};
use duel_rounds::core::{EngineError, PlayerId, ResolveMode, RoundOptions, StoreError};
use duel_rounds::games::guess::{Guess, GuessDuel, GuessMove, GuessTable};
use duel_rounds::games::search::SearchDuel;
use duel_rounds::rules::{EngineStatus, RoundBuilder, RoundEngine, RoundEvent, RoundId, SlotView, Viewer};
use duel_rounds::runtime::{Lobby, MemoryStore, RoundHandle, RoundStore};

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);

fn guess_round(mode: ResolveMode) -> RoundEngine<GuessDuel> {
    RoundBuilder::new()
        .seats(2, 0)
        .options(RoundOptions::default().with_resolve(mode).with_seed(17))
        .build(GuessDuel::default())
        .unwrap()
}

async fn table(handle: &RoundHandle<GuessDuel>) -> GuessTable {
    handle
        .view(Viewer::Spectator)
        .await
        .unwrap()
        .current
        .unwrap()
        .table
}

/// Store that refuses every save.
struct BrokenStore;

impl RoundStore for BrokenStore {
    fn save(&self, _round: RoundId, _snapshot: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".into()))
    }

    fn load(&self, _round: RoundId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_concurrent_submits_are_serialized() {
    let lobby = Lobby::new(Arc::new(MemoryStore::new()));
    let handle = lobby.open(guess_round(ResolveMode::Auto)).await.unwrap();
    handle.start().await.unwrap();
    let t = table(&handle).await;

    let a = handle.clone();
    let b = handle.clone();
    let (first, second) = tokio::join!(
        tokio::spawn(async move { a.submit(t.active, GuessMove::Play(5)).await }),
        tokio::spawn(async move { b.submit(t.guesser, GuessMove::Guess(Guess::Lower)).await }),
    );
    let (first, second) = (first.unwrap().unwrap(), second.unwrap().unwrap());

    // Exactly one of the two transitions resolved the turn.
    assert_eq!(
        [first.resolved().is_some(), second.resolved().is_some()]
            .iter()
            .filter(|r| **r)
            .count(),
        1
    );
    let view = handle.view(Viewer::Spectator).await.unwrap();
    assert_eq!(view.status, EngineStatus::Resolved { order: 1 });
}

#[tokio::test]
async fn test_submit_racing_resolve_never_lands_late() {
    let lobby = Lobby::new(Arc::new(MemoryStore::new()));
    let handle = lobby.open(guess_round(ResolveMode::Manual)).await.unwrap();
    handle.start().await.unwrap();
    let t = table(&handle).await;
    handle.submit(t.active, GuessMove::Play(3)).await.unwrap();
    handle.submit(t.guesser, GuessMove::Guess(Guess::Higher)).await.unwrap();

    let resolver = handle.clone();
    let late = handle.clone();
    let (resolved, retry) = tokio::join!(
        resolver.resolve(),
        late.submit(t.guesser, GuessMove::Guess(Guess::Lower))
    );

    assert!(resolved.is_ok());
    assert!(matches!(
        retry,
        Err(EngineError::AlreadyLocked(_)) | Err(EngineError::TurnClosed { .. })
    ));
    let view = handle.view(Viewer::Spectator).await.unwrap();
    let slot = view.current.unwrap().slot(t.guesser).cloned();
    assert!(matches!(
        slot,
        Some(SlotView::Revealed { value: GuessMove::Guess(Guess::Higher), .. })
    ));
}

#[tokio::test]
async fn test_notices_carry_no_hidden_values() {
    let lobby = Lobby::new(Arc::new(MemoryStore::new()));
    let handle = lobby.open(guess_round(ResolveMode::Manual)).await.unwrap();
    let mut notices = handle.subscribe();
    handle.start().await.unwrap();
    let t = table(&handle).await;
    handle.submit(t.active, GuessMove::Play(8)).await.unwrap();

    let mut seen = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        assert_eq!(notice.round, handle.id());
        seen.push(notice.event);
    }
    assert_eq!(seen[0], RoundEvent::Started);
    assert!(matches!(seen[1], RoundEvent::TurnOpened { order: 1, .. }));
    assert_eq!(
        seen[2],
        RoundEvent::Committed {
            order: 1,
            player: t.active
        }
    );
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn test_operations_persist_before_commit() {
    let store: Arc<dyn RoundStore> = Arc::new(MemoryStore::new());
    let lobby = Lobby::new(Arc::clone(&store));
    let round = guess_round(ResolveMode::Manual);
    let id = round.id();
    lobby.open(round).await.unwrap();

    // A store that refuses writes keeps rounds from opening.
    let broken = Lobby::<GuessDuel>::new(Arc::new(BrokenStore));
    assert!(matches!(
        broken.open(guess_round(ResolveMode::Manual)).await,
        Err(EngineError::Store(StoreError::Unavailable(_)))
    ));

    let handle = lobby.get(id).await.unwrap();
    handle.start().await.unwrap();
    let restored = RoundEngine::<GuessDuel>::restore(&store.load(id).unwrap().unwrap()).unwrap();
    assert_eq!(restored.revision(), 1);
    assert_eq!(restored.status(), EngineStatus::Open { order: 1 });
}

#[tokio::test]
async fn test_resume_from_store() {
    let store = Arc::new(MemoryStore::new());
    let round = guess_round(ResolveMode::Manual);
    let id = round.id();

    {
        let lobby = Lobby::new(store.clone());
        let handle = lobby.open(round).await.unwrap();
        handle.start().await.unwrap();
        handle.submit(P0, GuessMove::Play(4)).await.unwrap();
    }

    let lobby = Lobby::<GuessDuel>::new(store.clone());
    assert!(lobby.get(id).await.is_none());
    let handle = lobby.resume(id).await.unwrap();
    let view = handle.view(Viewer::Participant(P1)).await.unwrap();
    assert_eq!(view.revision, 2);
    assert!(view.awaits(P1));
    assert!(!view.awaits(P0));

    assert!(matches!(
        lobby.resume(RoundId::new_v4()).await,
        Err(EngineError::Store(StoreError::Missing(_)))
    ));
}

#[tokio::test]
async fn test_resume_rejects_truncated_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let mut round = guess_round(ResolveMode::Manual);
    let id = round.id();
    round.start().unwrap();

    let mut bytes = round.snapshot().unwrap();
    bytes.truncate(bytes.len() / 2);
    store.put(id, bytes).unwrap();

    let lobby = Lobby::<GuessDuel>::new(store);
    assert!(matches!(
        lobby.resume(id).await,
        Err(EngineError::Store(StoreError::Codec(_)))
    ));
    assert!(lobby.ids().await.is_empty());
}

#[tokio::test]
async fn test_close_forgets_round() {
    let lobby = Lobby::new(Arc::new(MemoryStore::new()));
    let handle = lobby.open(guess_round(ResolveMode::Manual)).await.unwrap();
    assert!(lobby.close(handle.id()).await);
    assert!(!lobby.close(handle.id()).await);
    assert!(lobby.ids().await.is_empty());
    // Outstanding handles keep the actor running.
    assert!(handle.start().await.is_ok());
}

#[tokio::test]
async fn test_bots_play_search_round() {
    let lobby = Lobby::<SearchDuel>::new(Arc::new(MemoryStore::new()));
    let round = RoundBuilder::new()
        .seats(5, 100)
        .options(RoundOptions::default().with_seed(3))
        .build(SearchDuel::default())
        .unwrap();
    let handle = lobby.open(round).await.unwrap();
    handle.start().await.unwrap();

    let mut players: Vec<SearchBot> = PlayerId::all(5).map(|p| SearchBot::new(p, u64::from(p.0))).collect();
    for _ in 0..20 {
        for bot in &mut players {
            bots::act(bot, &handle).await.unwrap();
        }
        let view = handle.view(Viewer::Spectator).await.unwrap();
        match view.status {
            EngineStatus::Open { .. } => {
                handle.resolve().await.unwrap();
            }
            EngineStatus::Resolved { .. } => {
                handle.advance().await.unwrap();
            }
            EngineStatus::Finished | EngineStatus::NotStarted => break,
        }
    }

    let view = handle.view(Viewer::Spectator).await.unwrap();
    assert_eq!(view.status, EngineStatus::Finished);
    assert!(view.result.is_some());
    // Entry, two duels, the re-commit and the final duel.
    assert_eq!(view.history.len() + 1, 5);
}
