use serde::{Deserialize, Serialize};

use crate::*;

/// Integer type used for range bounds, the secret and player guesses.
pub type Number = i64;

/// Inclusive range the secret is drawn from, always with `lower < upper`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRange {
    lower: Number,
    upper: Number,
}

impl GuessRange {
    pub const fn new(lower: Number, upper: Number) -> Result<Self> {
        if lower < upper {
            Ok(Self { lower, upper })
        } else {
            Err(GameError::InvalidRange { lower, upper })
        }
    }

    pub const fn lower(self) -> Number {
        self.lower
    }

    pub const fn upper(self) -> Number {
        self.upper
    }

    pub const fn contains(self, value: Number) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub(crate) fn validate(self) -> Result<Self> {
        Self::new(self.lower, self.upper)
    }
}

impl Default for GuessRange {
    fn default() -> Self {
        Self {
            lower: 1,
            upper: 100,
        }
    }
}
