use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::*;

/// Game state shared between the input loop and the autosave thread.
pub type SharedGame = Arc<Mutex<GameState>>;

pub fn share(game: GameState) -> SharedGame {
    Arc::new(Mutex::new(game))
}

/// Locks the shared game; a panic on the other side does not leave the state half-written, so poisoning is ignored.
pub fn lock(game: &SharedGame) -> MutexGuard<'_, GameState> {
    game.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Background thread saving the game while it is in progress.
#[derive(Debug)]
pub struct Autosave {
    handle: JoinHandle<SaveResult<()>>,
}

impl Autosave {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_POLL: Duration = Duration::from_millis(100);

    /// Saves right away, then once per `interval`, checking every `poll` whether the game is still in progress.
    ///
    /// The interval never drops below one poll step, so a zero interval still paces the writes.
    pub fn spawn(game: SharedGame, save: SaveFile, interval: Duration, poll: Duration) -> Self {
        let (interval, poll) = cadence(interval, poll);
        let handle = thread::spawn(move || run(&game, &save, interval, poll));
        Self { handle }
    }

    /// Waits for the thread to stop; an error means the game was forfeited because it could not be saved.
    pub fn join(self) -> SaveResult<()> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

fn cadence(interval: Duration, poll: Duration) -> (Duration, Duration) {
    let poll = poll.max(Duration::from_millis(1));
    (interval.max(poll), poll)
}

fn run(game: &SharedGame, save: &SaveFile, interval: Duration, poll: Duration) -> SaveResult<()> {
    log::debug!("autosave to {} every {:?}", save.path().display(), interval);
    loop {
        // snapshot under the lock, write outside of it
        let snapshot = {
            let game = lock(game);
            if !game.is_in_progress() {
                break;
            }
            game.clone()
        };

        if let Err(err) = save.save(&snapshot) {
            log::error!("autosave failed, forfeiting game: {}", err);
            lock(game).forfeit();
            return Err(err);
        }

        if !wait_while_in_progress(game, interval, poll) {
            break;
        }
    }
    log::debug!("autosave stopped");
    Ok(())
}

/// Sleeps for `interval` in `poll` steps, returns early with `false` once the game leaves `InProgress`.
fn wait_while_in_progress(game: &SharedGame, interval: Duration, poll: Duration) -> bool {
    let mut waited = Duration::ZERO;
    while waited < interval {
        let step = poll.min(interval - waited);
        thread::sleep(step);
        waited += step;
        if !lock(game).is_in_progress() {
            return false;
        }
    }
    true
}
