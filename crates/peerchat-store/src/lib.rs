//! # peerchat-store
//!
//! Client-side conversation state for peerchat.
//!
//! Conversations, read positions, typing indicators and the roster live in
//! memory only and are dropped on sign-out. The one durable piece is the
//! preference key-value table, kept in a small SQLite database so the sound
//! and notification toggles survive restarts.

pub mod conversations;
pub mod database;
pub mod migrations;
pub mod models;
pub mod preferences;
pub mod read_positions;
pub mod roster;
pub mod typing;

mod error;

pub use conversations::ConversationStore;
pub use database::Database;
pub use error::StoreError;
pub use models::*;
pub use preferences::{PreferenceSnapshot, Preferences};
pub use read_positions::ReadPositions;
pub use roster::Roster;
pub use typing::TypingRegistry;
