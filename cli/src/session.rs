use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use sweeper_core::*;
use sweeper_store::{GameResult, Outcome};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What observers see after every change to the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub state: GameState,
    pub elapsed_secs: u32,
    pub mines_left: i32,
    pub unrevealed_cells: CellCount,
}

impl Snapshot {
    fn of(engine: &GameEngine) -> Self {
        Self {
            state: engine.state(),
            elapsed_secs: engine.elapsed_secs(),
            mines_left: engine.mines_left(),
            unrevealed_cells: engine.count_unrevealed_cells(),
        }
    }
}

/// Builds the record kept for a finished game.
pub fn build_result(engine: &GameEngine, alias: &str, timestamp: DateTime<Utc>) -> GameResult {
    let summary = engine.summary();
    GameResult {
        timestamp,
        duration_secs: summary.elapsed_secs,
        outcome: if summary.won {
            Outcome::Won
        } else {
            Outcome::Lost
        },
        flagged_mines: summary.flagged_mines,
        unrevealed_mines: summary.unrevealed_mines,
        loss_reason: summary.loss_reason.map(|reason| reason.to_string()),
        alias: alias.to_string(),
    }
}

struct Inner {
    engine: GameEngine,
    result: Option<GameResult>,
}

struct Shared {
    inner: Mutex<Inner>,
    alias: String,
    state_tx: watch::Sender<Snapshot>,
}

impl Shared {
    /// Runs one mutation under the lock, then publishes the new state.
    fn apply<R>(&self, mutate: impl FnOnce(&mut GameEngine) -> R) -> R {
        let mut inner = self.inner.lock();
        let out = mutate(&mut inner.engine);

        if inner.engine.is_finished() && inner.result.is_none() {
            let result = build_result(&inner.engine, &self.alias, Utc::now());
            log::info!("Game over after {}s: {}", result.duration_secs, result.outcome);
            inner.result = Some(result);
        }
        self.state_tx.send_replace(Snapshot::of(&inner.engine));
        out
    }
}

/// One running game: serializes player moves against the one-second timer and publishes every change.
///
/// Must be started from within a tokio runtime. Dropping the session cancels its timer.
pub struct GameSession {
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl GameSession {
    pub fn start(engine: GameEngine, alias: impl Into<String>) -> Self {
        let (state_tx, _) = watch::channel(Snapshot::of(&engine));
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                engine,
                result: None,
            }),
            alias: alias.into(),
            state_tx,
        });
        let timer = spawn_timer(Arc::clone(&shared));
        Self {
            shared,
            timer: Mutex::new(Some(timer)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        *self.shared.state_tx.borrow()
    }

    pub fn board(&self) -> Board {
        self.shared.inner.lock().engine.board().clone()
    }

    pub fn moves(&self) -> Vec<Move> {
        self.shared.inner.lock().engine.moves().to_vec()
    }

    pub fn side(&self) -> Coord {
        self.shared.inner.lock().engine.config().side
    }

    /// The record of this game, once it is over.
    pub fn result(&self) -> Option<GameResult> {
        self.shared.inner.lock().result.clone()
    }

    pub fn reveal(&self, coords: Coord2) -> RevealOutcome {
        let outcome = self.shared.apply(|engine| engine.reveal_cell(coords));
        self.cancel_if_finished();
        outcome
    }

    pub fn toggle_flag(&self, coords: Coord2) -> FlagOutcome {
        let outcome = self.shared.apply(|engine| engine.toggle_flag(coords));
        self.cancel_if_finished();
        outcome
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.lock().is_some() && self.shared.inner.lock().engine.timer_running()
    }

    /// Freezes the clock and cancels the timer task. Later calls do nothing.
    pub fn stop_timer(&self) {
        let Some(handle) = self.timer.lock().take() else {
            return;
        };
        handle.abort();
        self.shared.apply(GameEngine::stop_timer);
        log::debug!("Timer cancelled");
    }

    fn cancel_if_finished(&self) {
        if self.snapshot().state.is_finished() {
            self.stop_timer();
        }
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

fn spawn_timer(shared: Arc<Shared>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            match shared.apply(GameEngine::tick) {
                TickOutcome::Ticked => continue,
                TickOutcome::TimedOut => {
                    log::debug!("Time limit reached");
                    break;
                }
                TickOutcome::Idle => break,
            }
        }
    })
}
