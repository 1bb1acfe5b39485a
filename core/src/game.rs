use chrono::prelude::*;
use chrono::TimeDelta;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> Suspended
/// - InProgress -> Forfeited
/// - Suspended -> InProgress
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    InProgress,
    Won,
    Suspended,
    Forfeited,
}

impl Status {
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Won and forfeited games never change status again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Forfeited)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::InProgress
    }
}

/// Answer to a single guess.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verdict {
    TooLow,
    Correct,
    TooHigh,
}

impl Verdict {
    pub fn of(guess: Number, secret: Number) -> Self {
        use core::cmp::Ordering::*;
        match guess.cmp(&secret) {
            Less => Self::TooLow,
            Equal => Self::Correct,
            Greater => Self::TooHigh,
        }
    }
}

/// One entry of the move log, either a guess with its verdict or a suspend/forfeit marker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub guess: Option<Number>,
    pub verdict: Option<Verdict>,
    pub status: Status,
    pub timestamp: DateTime<Utc>,
}

impl Move {
    fn guess(guess: Number, verdict: Verdict, status: Status, timestamp: DateTime<Utc>) -> Self {
        Self {
            guess: Some(guess),
            verdict: Some(verdict),
            status,
            timestamp,
        }
    }

    fn marker(status: Status, timestamp: DateTime<Utc>) -> Self {
        Self {
            guess: None,
            verdict: None,
            status,
            timestamp,
        }
    }

    pub const fn is_guess(&self) -> bool {
        self.guess.is_some()
    }
}

/// Represents a game from the secret draw until it is won, suspended or forfeited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    range: GuessRange,
    status: Status,
    secret: SealedSecret,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    moves: Vec<Move>,
}

impl GameState {
    pub fn new(range: GuessRange) -> Self {
        Self::with_seed(range, rand::random())
    }

    /// Draws the secret, key and IV from a generator seeded with `seed`.
    pub fn with_seed(range: GuessRange, seed: u64) -> Self {
        use rand::prelude::*;

        let mut rng = StdRng::seed_from_u64(seed);
        let secret = rng.random_range(range.lower()..=range.upper());
        Self::from_sealed(range, SealedSecret::seal(secret, &mut rng))
    }

    /// Starts a game with a known secret.
    pub fn with_secret(range: GuessRange, secret: Number) -> Result<Self> {
        if !range.contains(secret) {
            return Err(GameError::SecretOutOfRange {
                secret,
                lower: range.lower(),
                upper: range.upper(),
            });
        }
        let mut rng = StdRng::seed_from_u64(rand::random());
        Ok(Self::from_sealed(range, SealedSecret::seal(secret, &mut rng)))
    }

    fn from_sealed(range: GuessRange, secret: SealedSecret) -> Self {
        let now = Utc::now();
        log::debug!(
            "new game in [{}, {}] started at {}",
            range.lower(),
            range.upper(),
            now
        );
        Self {
            range,
            status: Default::default(),
            secret,
            started_at: now,
            ended_at: None,
            moves: Vec::new(),
        }
    }

    pub fn range(&self) -> GuessRange {
        self.range
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_in_progress(&self) -> bool {
        self.status.is_in_progress()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Number of guesses made so far, markers excluded.
    pub fn attempts(&self) -> usize {
        self.moves.iter().filter(|m| m.is_guess()).count()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn elapsed(&self) -> TimeDelta {
        self.elapsed_at(Utc::now())
    }

    /// Time played as seen at `now`, frozen at the end time once the game left `InProgress`.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> TimeDelta {
        match (self.status, self.ended_at) {
            (Status::InProgress, _) | (_, None) => now - self.started_at,
            (_, Some(ended_at)) => ended_at - self.started_at,
        }
    }

    /// Compares `guess` with the secret, only logging the move and changing the status while in progress.
    pub fn evaluate(&mut self, guess: Number) -> Verdict {
        let verdict = Verdict::of(guess, self.secret.open());

        if !self.status.is_in_progress() {
            log::debug!("guess {} ignored, game is {:?}", guess, self.status);
            return verdict;
        }

        let now = Utc::now();
        if verdict == Verdict::Correct {
            self.end_game(Status::Won, now);
        }
        self.moves.push(Move::guess(guess, verdict, self.status, now));
        log::debug!("guess {} -> {:?}", guess, verdict);
        verdict
    }

    pub fn suspend(&mut self) {
        if self.status.is_in_progress() {
            let now = Utc::now();
            self.end_game(Status::Suspended, now);
            self.moves.push(Move::marker(Status::Suspended, now));
        }
    }

    /// Puts a suspended game back in progress, keeping the end time and the move log as they are.
    pub fn resume(&mut self) {
        if matches!(self.status, Status::Suspended) {
            log::debug!("resumed game");
            self.status = Status::InProgress;
        }
    }

    /// Gives up an in-progress game; the secret is returned whatever the status.
    pub fn forfeit(&mut self) -> Number {
        if self.status.is_in_progress() {
            let now = Utc::now();
            self.end_game(Status::Forfeited, now);
            self.moves.push(Move::marker(Status::Forfeited, now));
        }
        self.secret.open()
    }

    fn end_game(&mut self, status: Status, now: DateTime<Utc>) {
        self.status = status;
        self.ended_at.replace(now);
        log::debug!("game {:?} at {}", status, now);
    }

    /// Checks a state restored from elsewhere against the invariants kept by the methods above.
    pub fn validate(&self) -> Result<()> {
        use GameError::InconsistentHistory;

        let range = self.range.validate()?;
        let secret = self.secret.open();
        if !range.contains(secret) {
            return Err(GameError::SecretOutOfRange {
                secret,
                lower: range.lower(),
                upper: range.upper(),
            });
        }

        let won: Vec<_> = self
            .moves
            .iter()
            .filter(|m| m.status == Status::Won)
            .collect();
        match (self.status, won.as_slice()) {
            (Status::Won, [winning]) if winning.verdict == Some(Verdict::Correct) => {}
            (Status::Won, _) => return Err(InconsistentHistory("won game needs one winning move")),
            (_, []) => {}
            (_, _) => return Err(InconsistentHistory("winning move in a game that was not won")),
        }

        let forfeits = self
            .moves
            .iter()
            .filter(|m| m.status == Status::Forfeited)
            .count();
        if forfeits != usize::from(self.status == Status::Forfeited) {
            return Err(InconsistentHistory("forfeit marker does not match status"));
        }

        if !self.status.is_in_progress() && self.ended_at.is_none() {
            return Err(InconsistentHistory("finished game without end time"));
        }

        // the wall clock may step back between moves
        let mut previous = self.started_at;
        for (i, m) in self.moves.iter().enumerate() {
            if m.timestamp < previous {
                log::warn!(
                    "move {} recorded {} before the one preceding it",
                    i + 1,
                    previous - m.timestamp
                );
            }
            previous = m.timestamp;
        }

        Ok(())
    }
}
