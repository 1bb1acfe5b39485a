use std::io::{self, BufRead, Write};

use chrono::prelude::*;
use chrono::TimeDelta;
use crossterm::cursor::MoveTo;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use highlow_core::{
    GuessRange, Move, Number, PlayerInput, Presentation, SaveError, SessionSummary, Status, Verdict,
    active_offsets,
};

pub(crate) const SUSPEND_KEY: char = 'X';
pub(crate) const FORFEIT_KEY: char = 'C';

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum InputError {
    NotANumber,
    Overflow,
}

/// Reads one prompt line: `X` suspends, `C` forfeits, anything else must be a number.
pub(crate) fn parse_input(line: &str) -> Result<PlayerInput, InputError> {
    use std::num::IntErrorKind::*;

    let line = line.trim();
    match line.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some(SUSPEND_KEY) => return Ok(PlayerInput::Suspend),
        Some(FORFEIT_KEY) => return Ok(PlayerInput::Forfeit),
        _ => {}
    }
    line.parse::<Number>()
        .map(PlayerInput::Guess)
        .map_err(|err| match err.kind() {
            PosOverflow | NegOverflow => InputError::Overflow,
            _ => InputError::NotANumber,
        })
}

/// Line-based terminal front end.
pub(crate) struct Terminal<R, W> {
    input: R,
    output: W,
    clear_screen: bool,
}

impl Terminal<io::StdinLock<'static>, io::Stdout> {
    pub(crate) fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), true)
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub(crate) fn new(input: R, output: W, clear_screen: bool) -> Self {
        Self {
            input,
            output,
            clear_screen,
        }
    }

    pub(crate) fn describe_game(&mut self) -> io::Result<()> {
        writeln!(self.output, "Too high, too low.")?;
        writeln!(self.output, "I pick a number, you try to guess it.")?;
        writeln!(
            self.output,
            "For every guess I answer too high, too low or correct."
        )
    }

    pub(crate) fn clear(&mut self) -> io::Result<()> {
        if self.clear_screen {
            crossterm::execute!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    /// Reads a line, `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn try_render_range(&mut self, range: GuessRange) -> io::Result<()> {
        writeln!(
            self.output,
            "The number is between {} and {}.",
            range.lower(),
            range.upper()
        )
    }

    fn try_prompt_for_guess(&mut self) -> io::Result<PlayerInput> {
        loop {
            write!(
                self.output,
                "Your guess ({} to suspend, {} to give up): ",
                SUSPEND_KEY, FORFEIT_KEY
            )?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                log::info!("end of input, suspending");
                return Ok(PlayerInput::Suspend);
            };
            match parse_input(&line) {
                Ok(input) => return Ok(input),
                Err(InputError::NotANumber) => {
                    writeln!(self.output, "That does not look like a number, try again.")?
                }
                Err(InputError::Overflow) => {
                    writeln!(self.output, "That number is way too big, try again.")?
                }
            }
        }
    }

    fn try_confirm(&mut self, prompt: &str) -> io::Result<bool> {
        write!(self.output, "{} (y/n) ", prompt)?;
        Ok(self
            .read_line()?
            .and_then(|line| line.trim().chars().next())
            .is_some_and(|c| c.eq_ignore_ascii_case(&'y')))
    }

    fn try_render_verdict(&mut self, verdict: Verdict) -> io::Result<()> {
        self.clear()?;
        match verdict {
            Verdict::TooHigh => writeln!(self.output, "{}", "Too high!".red()),
            Verdict::TooLow => writeln!(self.output, "{}", "Too low!".red()),
            Verdict::Correct => writeln!(self.output, "{}", "Correct!".green()),
        }
    }

    fn try_render_history(&mut self, moves: &[Move], started_at: DateTime<Utc>) -> io::Result<()> {
        if moves.is_empty() {
            return writeln!(self.output, "--- no moves yet ---");
        }

        writeln!(
            self.output,
            "{:>3}  {:>12}  {:<9}  {:>9}  {}",
            "No", "Guess", "Verdict", "Time", "Status"
        )?;
        writeln!(self.output, "{}", "=".repeat(52))?;
        for (i, (m, offset)) in moves
            .iter()
            .zip(active_offsets(moves, started_at))
            .enumerate()
        {
            let guess = m.guess.map(|g| g.to_string()).unwrap_or_default();
            let verdict = m.verdict.map(verdict_label).unwrap_or_default();
            writeln!(
                self.output,
                "{:>3}  {:>12}  {:<9}  {:>9}  {}",
                i + 1,
                guess,
                verdict,
                format_duration(offset),
                status_label(m.status)
            )?;
        }
        Ok(())
    }

    fn try_render_summary(&mut self, summary: &SessionSummary) -> io::Result<()> {
        match summary.status {
            Status::Won => writeln!(
                self.output,
                "You got it in {} guesses and {}.",
                summary.attempts,
                format_duration(summary.elapsed)
            )?,
            Status::Suspended => writeln!(
                self.output,
                "Game suspended after {} guesses, it will be offered again next time.",
                summary.attempts
            )?,
            Status::Forfeited | Status::InProgress => {
                if let Some(secret) = summary.revealed_secret {
                    writeln!(self.output, "The correct answer was {}.", secret)?;
                }
                writeln!(self.output, "Guesses made: {}", summary.attempts)?;
            }
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Presentation for Terminal<R, W> {
    fn render_range(&mut self, range: GuessRange) {
        if let Err(err) = self.try_render_range(range) {
            log::error!("failed to show range: {}", err);
        }
    }

    fn prompt_for_guess(&mut self) -> PlayerInput {
        self.try_prompt_for_guess().unwrap_or_else(|err| {
            log::error!("failed to read guess, suspending: {}", err);
            PlayerInput::Suspend
        })
    }

    fn render_verdict(&mut self, verdict: Verdict) {
        if let Err(err) = self.try_render_verdict(verdict) {
            log::error!("failed to show verdict: {}", err);
        }
    }

    fn render_history(&mut self, moves: &[Move], started_at: DateTime<Utc>) {
        if let Err(err) = self.try_render_history(moves, started_at) {
            log::error!("failed to show history: {}", err);
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.try_confirm(prompt).unwrap_or_else(|err| {
            log::error!("failed to read answer: {}", err);
            false
        })
    }

    fn report_save_error(&mut self, err: &SaveError) {
        if let Err(io_err) = writeln!(self.output, "{}", err.to_string().yellow()) {
            log::error!("failed to report save error: {}", io_err);
        }
    }

    fn render_summary(&mut self, summary: &SessionSummary) {
        if let Err(err) = self.try_render_summary(summary) {
            log::error!("failed to show summary: {}", err);
        }
    }
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::TooLow => "too low",
        Verdict::Correct => "correct",
        Verdict::TooHigh => "too high",
    }
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::InProgress => "playing",
        Status::Won => "won",
        Status::Suspended => "suspended",
        Status::Forfeited => "gave up",
    }
}

fn format_duration(delta: TimeDelta) -> String {
    let millis = delta.num_milliseconds();
    format!("{}.{}s", millis / 1000, (millis % 1000).abs() / 100)
}
