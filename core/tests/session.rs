use std::collections::VecDeque;
use std::time::Duration;

use chrono::prelude::*;
use highlow_core::*;
use tempfile::TempDir;

/// Plays back queued inputs and records everything the session shows.
#[derive(Default)]
struct Script {
    inputs: VecDeque<PlayerInput>,
    confirm_resume: bool,
    ranges: Vec<GuessRange>,
    verdicts: Vec<Verdict>,
    histories: Vec<usize>,
    prompts: Vec<String>,
    save_errors: usize,
    summaries: Vec<SessionSummary>,
}

impl Script {
    fn new(inputs: impl IntoIterator<Item = PlayerInput>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Presentation for Script {
    fn render_range(&mut self, range: GuessRange) {
        self.ranges.push(range);
    }

    fn prompt_for_guess(&mut self) -> PlayerInput {
        self.inputs.pop_front().unwrap_or(PlayerInput::Suspend)
    }

    fn render_verdict(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    fn render_history(&mut self, moves: &[Move], _started_at: DateTime<Utc>) {
        self.histories.push(moves.len());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_owned());
        self.confirm_resume
    }

    fn report_save_error(&mut self, _err: &SaveError) {
        self.save_errors += 1;
    }

    fn render_summary(&mut self, summary: &SessionSummary) {
        self.summaries.push(summary.clone());
    }
}

fn config(lower: Number, upper: Number) -> SessionConfig {
    SessionConfig {
        range: GuessRange::new(lower, upper).unwrap(),
        autosave_interval: Duration::from_secs(10),
        status_poll: Duration::from_millis(5),
    }
}

fn save_in(dir: &TempDir) -> SaveFile {
    SaveFile::new(dir.path().join("save.json"))
}

#[test]
fn single_value_search_wins() {
    let dir = TempDir::new().unwrap();
    let session = Session::new(config(1, 2), save_in(&dir));
    let mut ui = Script::new([PlayerInput::Guess(1), PlayerInput::Guess(2)]);

    let summary = session.run(&mut ui);

    assert_eq!(summary.status, Status::Won);
    assert_eq!(summary.revealed_secret, None);
    assert!((1..=2).contains(&summary.attempts));
    assert_eq!(ui.verdicts.last(), Some(&Verdict::Correct));
    assert_eq!(ui.summaries, [summary]);
    assert!(!save_in(&dir).exists());
}

#[test]
fn forfeit_reveals_secret_and_removes_save() {
    let dir = TempDir::new().unwrap();
    let session = Session::new(config(1, 100), save_in(&dir));
    let mut ui = Script::new([PlayerInput::Guess(500), PlayerInput::Forfeit]);

    let summary = session.run(&mut ui);

    assert_eq!(summary.status, Status::Forfeited);
    assert_eq!(summary.attempts, 1);
    assert_eq!(ui.verdicts, [Verdict::TooHigh]);
    let secret = summary.revealed_secret.unwrap();
    assert!((1..=100).contains(&secret));
    assert!(!save_in(&dir).exists());
}

#[test]
fn suspended_game_is_saved_and_resumed() {
    let dir = TempDir::new().unwrap();
    let session = Session::new(config(1, 100), save_in(&dir));

    let mut first = Script::new([PlayerInput::Guess(0), PlayerInput::Suspend]);
    let summary = session.run(&mut first);
    assert_eq!(summary.status, Status::Suspended);
    let saved = save_in(&dir).load().unwrap();
    assert_eq!(saved.status(), Status::Suspended);
    assert_eq!(saved.moves().len(), 2);

    let mut second = Script::new([PlayerInput::Guess(101), PlayerInput::Forfeit]);
    second.confirm_resume = true;
    let summary = session.run(&mut second);

    assert_eq!(second.prompts, [Session::RESUME_PROMPT]);
    // history shown before the resume question, then after the guess
    assert_eq!(second.histories, [2, 3]);
    assert_eq!(summary.status, Status::Forfeited);
    assert_eq!(summary.attempts, 2);
    assert_eq!(summary.revealed_secret, Some(saved.clone().forfeit()));
    assert!(!save_in(&dir).exists());
}

#[test]
fn declined_resume_starts_new_game() {
    let dir = TempDir::new().unwrap();
    let save = save_in(&dir);
    let mut old = GameState::with_secret(GuessRange::new(1, 100).unwrap(), 50).unwrap();
    old.evaluate(10);
    old.suspend();
    save.save(&old).unwrap();

    let mut ui = Script::new([PlayerInput::Forfeit]);
    let summary = Session::new(config(1, 100), save.clone()).run(&mut ui);

    assert_eq!(ui.prompts.len(), 1);
    assert_eq!(ui.ranges, [GuessRange::new(1, 100).unwrap()]);
    assert_eq!(summary.attempts, 0);
    assert_eq!(summary.status, Status::Forfeited);
    assert!(!save.exists());
}

#[test]
fn corrupt_save_is_reported_and_replaced() {
    let dir = TempDir::new().unwrap();
    let save = save_in(&dir);
    std::fs::write(save.path(), b"not a snapshot").unwrap();

    let mut ui = Script::new([PlayerInput::Suspend]);
    let summary = Session::new(config(1, 100), save.clone()).run(&mut ui);

    assert_eq!(ui.save_errors, 1);
    assert!(ui.prompts.is_empty());
    assert_eq!(summary.status, Status::Suspended);
    assert!(save.load().is_ok());
}

#[test]
fn finished_save_is_not_offered() {
    let dir = TempDir::new().unwrap();
    let save = save_in(&dir);
    let mut won = GameState::with_secret(GuessRange::new(1, 100).unwrap(), 50).unwrap();
    won.evaluate(50);
    save.save(&won).unwrap();

    let mut ui = Script::new([PlayerInput::Forfeit]);
    let summary = Session::new(config(1, 100), save).run(&mut ui);

    assert!(ui.prompts.is_empty());
    assert_eq!(summary.attempts, 0);
}

#[test]
fn unwritable_save_forfeits_game() {
    let dir = TempDir::new().unwrap();
    // a directory cannot be replaced by the snapshot file
    let save = SaveFile::new(dir.path());

    let mut ui = Script::new([PlayerInput::Guess(0), PlayerInput::Guess(-1)]);
    let summary = Session::new(config(1, 1000), save).run(&mut ui);

    assert_eq!(summary.status, Status::Forfeited);
    assert!(summary.revealed_secret.is_some());
    assert!(ui.save_errors >= 1);
}

#[test]
fn resumed_game_announces_its_own_range() {
    let dir = TempDir::new().unwrap();
    let save = save_in(&dir);
    let mut old = GameState::with_secret(GuessRange::new(-20, 20).unwrap(), 4).unwrap();
    old.evaluate(0);
    old.suspend();
    save.save(&old).unwrap();

    let mut ui = Script::new([PlayerInput::Guess(4)]);
    ui.confirm_resume = true;
    let summary = Session::new(config(1, 100), save).run(&mut ui);

    assert_eq!(ui.ranges, [GuessRange::new(-20, 20).unwrap()]);
    assert_eq!(summary.status, Status::Won);
    assert_eq!(summary.attempts, 2);
}
