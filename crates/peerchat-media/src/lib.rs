//! Audible cue for newly arrived messages: a short synthesized tone and the
//! players that can render it.

pub mod chime;
pub mod error;
pub mod playback;

pub use chime::{synthesize_chime, ChimeConfig};
pub use error::AudioError;
pub use playback::{default_player, ChimePlayer};
