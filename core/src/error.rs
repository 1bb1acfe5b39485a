use std::path::PathBuf;

use thiserror::Error;

use crate::Number;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid range, lower bound {lower} must be below upper bound {upper}")]
    InvalidRange { lower: Number, upper: Number },
    #[error("Secret {secret} lies outside of [{lower}, {upper}]")]
    SecretOutOfRange {
        secret: Number,
        lower: Number,
        upper: Number,
    },
    #[error("Move history does not match game status: {0}")]
    InconsistentHistory(&'static str),
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure to persist or restore a game snapshot.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Could not access save file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not encode game snapshot")]
    Encode(#[source] serde_json::Error),
    #[error("Save file {path} is corrupt")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Save file version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("Save file holds an invalid game")]
    Invalid(#[from] GameError),
}

pub type SaveResult<T> = core::result::Result<T, SaveError>;
