//! Durable snapshots of a [`GameState`].
//!
//! A snapshot is a versioned JSON envelope written to a single file. Writes go through a temporary file in the same
//! directory that is then renamed over the target, so readers only ever see a complete snapshot.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::*;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    game: &'a GameState,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    game: GameState,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Snapshot location for a single game session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveFile {
    path: PathBuf,
}

impl SaveFile {
    pub const VERSION: u32 = 1;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes `game` over any previous snapshot.
    pub fn save(&self, game: &GameState) -> SaveResult<()> {
        let snapshot = SnapshotRef {
            version: Self::VERSION,
            game,
        };
        let bytes = serde_json::to_vec_pretty(&snapshot).map_err(SaveError::Encode)?;
        self.write_atomic(&bytes).map_err(|source| SaveError::Io {
            path: self.path.clone(),
            source,
        })?;
        log::trace!(
            "saved {:?} game with {} moves to {}",
            game.status(),
            game.moves().len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn load(&self) -> SaveResult<GameState> {
        let bytes = fs::read(&self.path).map_err(|source| SaveError::Io {
            path: self.path.clone(),
            source,
        })?;
        let decode_error = |source| SaveError::Decode {
            path: self.path.clone(),
            source,
        };

        // check the version first so an old layout reports as unsupported rather than corrupt
        let VersionProbe { version } = serde_json::from_slice(&bytes).map_err(decode_error)?;
        if version != Self::VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: version,
                expected: Self::VERSION,
            });
        }

        let Snapshot { game, .. } = serde_json::from_slice(&bytes).map_err(decode_error)?;
        game.validate()?;
        log::debug!(
            "loaded {:?} game with {} moves from {}",
            game.status(),
            game.moves().len(),
            self.path.display()
        );
        Ok(game)
    }

    /// Removes the snapshot, a missing file is not an error.
    pub fn delete(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("deleted save file {}", self.path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => log::warn!("failed to delete {}: {}", self.path.display(), err),
        }
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}
