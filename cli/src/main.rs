use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use highlow_core::{Presentation, SaveFile, Session};

mod config;
mod terminal;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// TOML file with range and autosave settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where the in-progress game is saved, overrides the config file
    #[arg(short, long)]
    save_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mut config = match &args.config {
        Some(path) => config::Config::load(path)?,
        None => Default::default(),
    };
    if let Some(save_path) = args.save_path {
        config.save_path = save_path;
    }
    log::debug!("config: {:?}", config);

    let session_config = config.session()?;
    let session = Session::new(session_config, SaveFile::new(&config.save_path));
    let mut terminal = terminal::Terminal::stdio();

    terminal.describe_game()?;
    while terminal.confirm("Do you want to play a game?") {
        terminal.clear()?;
        let summary = session.run(&mut terminal);
        log::info!(
            "session ended {:?} after {} guesses",
            summary.status,
            summary.attempts
        );
    }
    Ok(())
}
