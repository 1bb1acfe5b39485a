//! Engine for the "too high / too low" number guessing game.
//!
//! [`GameState`] owns the secret and the move log, [`SaveFile`] persists it, [`Autosave`] keeps a snapshot fresh in the
//! background and [`Session`] drives one game against a [`Presentation`].

pub use autosave::*;
pub use error::*;
pub use game::*;
pub use persistence::*;
pub use secret::*;
pub use session::*;
pub use types::*;

mod autosave;
mod error;
mod game;
mod persistence;
mod secret;
mod session;
mod types;
