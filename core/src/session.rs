use std::time::Duration;

use chrono::prelude::*;
use chrono::TimeDelta;

use crate::*;

/// What the player asked for at the guess prompt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerInput {
    Guess(Number),
    Suspend,
    Forfeit,
}

/// Outcome of one played session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub status: Status,
    pub attempts: usize,
    pub elapsed: TimeDelta,
    /// The answer, shown when the game was forfeited.
    pub revealed_secret: Option<Number>,
}

/// Front end the session talks to, owning all terminal I/O.
pub trait Presentation {
    /// Announces the bounds of the game about to be played, new or resumed.
    fn render_range(&mut self, range: GuessRange);

    fn prompt_for_guess(&mut self) -> PlayerInput;

    fn render_verdict(&mut self, verdict: Verdict);

    fn render_history(&mut self, moves: &[Move], started_at: DateTime<Utc>);

    fn confirm(&mut self, prompt: &str) -> bool;

    fn report_save_error(&mut self, err: &SaveError);

    fn render_summary(&mut self, summary: &SessionSummary);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub range: GuessRange,
    pub autosave_interval: Duration,
    pub status_poll: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            range: Default::default(),
            autosave_interval: Autosave::DEFAULT_INTERVAL,
            status_poll: Autosave::DEFAULT_POLL,
        }
    }
}

/// Plays one game: resumes or starts it, runs the guess loop with autosave, then persists or cleans up.
#[derive(Clone, Debug)]
pub struct Session {
    config: SessionConfig,
    save: SaveFile,
}

impl Session {
    pub const RESUME_PROMPT: &'static str = "A saved game was found, do you want to resume it?";

    pub fn new(config: SessionConfig, save: SaveFile) -> Self {
        Self { config, save }
    }

    pub fn run(&self, ui: &mut impl Presentation) -> SessionSummary {
        let game = self.load_or_start(ui);
        ui.render_range(game.range());
        let game = share(game);
        let autosave = Autosave::spawn(
            game.clone(),
            self.save.clone(),
            self.config.autosave_interval,
            self.config.status_poll,
        );

        loop {
            let input = ui.prompt_for_guess();
            let mut state = lock(&game);
            if !state.is_in_progress() {
                // forfeited by a failed autosave while we were waiting on input
                break;
            }
            match input {
                PlayerInput::Suspend => state.suspend(),
                PlayerInput::Forfeit => {
                    state.forfeit();
                }
                PlayerInput::Guess(guess) => {
                    let verdict = state.evaluate(guess);
                    let moves = state.moves().to_vec();
                    let started_at = state.started_at();
                    drop(state);
                    ui.render_verdict(verdict);
                    ui.render_history(&moves, started_at);
                    state = lock(&game);
                }
            }
            if !state.is_in_progress() {
                break;
            }
        }

        if let Err(err) = autosave.join() {
            ui.report_save_error(&err);
        }

        let mut state = lock(&game);
        let summary = self.finish(&mut state, ui);
        drop(state);
        ui.render_summary(&summary);
        summary
    }

    fn load_or_start(&self, ui: &mut impl Presentation) -> GameState {
        if self.save.exists() {
            match self.save.load() {
                Ok(mut game) => {
                    let resumed = !game.status().is_terminal() && {
                        ui.render_history(game.moves(), game.started_at());
                        ui.confirm(Self::RESUME_PROMPT)
                    };
                    self.save.delete();
                    if resumed {
                        game.resume();
                        log::info!("resuming game with {} moves", game.moves().len());
                        return game;
                    }
                    log::info!("discarded saved game");
                }
                Err(err) => {
                    log::warn!("could not load {}: {}", self.save.path().display(), err);
                    ui.report_save_error(&err);
                    self.save.delete();
                }
            }
        }
        GameState::new(self.config.range)
    }

    fn finish(&self, game: &mut GameState, ui: &mut impl Presentation) -> SessionSummary {
        if game.status() == Status::Suspended {
            if let Err(err) = self.save.save(game) {
                log::error!("could not save suspended game, forfeiting: {}", err);
                ui.report_save_error(&err);
                game.resume();
                game.forfeit();
            }
        }

        let revealed_secret = match game.status() {
            Status::Forfeited => Some(game.forfeit()),
            _ => None,
        };
        if game.status().is_terminal() {
            self.save.delete();
        }

        SessionSummary {
            status: game.status(),
            attempts: game.attempts(),
            elapsed: game.elapsed(),
            revealed_secret,
        }
    }
}

/// Time of each move since the game started, not counting time spent suspended.
///
/// A suspension lasts from its marker until the next move, mirroring how the history table is read back to the
/// player.
pub fn active_offsets(moves: &[Move], started_at: DateTime<Utc>) -> Vec<TimeDelta> {
    let mut suspended_total = TimeDelta::zero();
    let mut suspended_since = None;

    moves
        .iter()
        .map(|m| {
            if m.status == Status::Suspended {
                suspended_since = Some(m.timestamp);
            } else if let Some(since) = suspended_since.take() {
                suspended_total += m.timestamp - since;
            }
            m.timestamp - started_at - suspended_total
        })
        .collect()
}
