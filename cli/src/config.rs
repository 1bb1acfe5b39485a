use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use highlow_core::{GuessRange, Number, SessionConfig};
use serde::{Deserialize, Serialize};

/// Settings read from the optional TOML config file, every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub lower: Number,
    pub upper: Number,
    pub save_path: PathBuf,
    pub autosave_interval_secs: u64,
    pub status_poll_millis: u64,
}

impl Config {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read config {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("could not parse config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub(crate) fn session(&self) -> Result<SessionConfig> {
        let range = GuessRange::new(self.lower, self.upper).context("invalid guess range")?;
        ensure!(
            self.autosave_interval_secs > 0,
            "autosave_interval_secs must be at least 1"
        );
        Ok(SessionConfig {
            range,
            autosave_interval: Duration::from_secs(self.autosave_interval_secs),
            status_poll: Duration::from_millis(self.status_poll_millis),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            lower: session.range.lower(),
            upper: session.range.upper(),
            save_path: PathBuf::from("save.json"),
            autosave_interval_secs: session.autosave_interval.as_secs(),
            status_poll_millis: session.status_poll.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_defaults() {
        let config = Config::default();

        assert_eq!(config.lower, 1);
        assert_eq!(config.upper, 100);
        assert_eq!(config.save_path, PathBuf::from("save.json"));
        assert_eq!(config.session().unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highlow.toml");
        fs::write(&path, "lower = -50\nupper = 50\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.lower, -50);
        assert_eq!(config.upper, 50);
        assert_eq!(config.autosave_interval_secs, 10);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highlow.toml");
        fs::write(&path, "difficulty = \"hard\"\n").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn inverted_range_fails_session_setup() {
        let config = Config {
            lower: 9,
            upper: 3,
            ..Default::default()
        };

        assert!(config.session().is_err());
    }

    #[test]
    fn zero_autosave_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highlow.toml");
        fs::write(&path, "autosave_interval_secs = 0\n").unwrap();

        let err = Config::load(&path).unwrap().session().unwrap_err();

        assert!(err.to_string().contains("autosave_interval_secs"));
    }
}
