//! Per-session state behind the client context's lock.
//!
//! Nothing in here awaits: every mutation runs to completion while the lock
//! is held, and the lock is released before any network call.

use std::time::Duration;

use peerchat_shared::identity::Identity;
use peerchat_shared::types::ConversationKey;
use peerchat_store::{ConversationStore, Roster, TypingRegistry};

use crate::error::{ClientError, Result};

pub struct AppState {
    /// `None` while signed out.
    pub identity: Option<Identity>,

    pub conversations: ConversationStore,

    pub roster: Roster,

    pub typing: TypingRegistry,

    /// Conversation currently on screen, if any.
    pub active_conversation: Option<ConversationKey>,

    /// Bumped on every sign-in and sign-out. Work started under an older
    /// generation must not touch the stores.
    pub generation: u64,
}

impl AppState {
    pub fn new(typing_window: Duration) -> Self {
        Self {
            identity: None,
            conversations: ConversationStore::new(),
            roster: Roster::new(),
            typing: TypingRegistry::new(typing_window),
            active_conversation: None,
            generation: 0,
        }
    }

    pub fn identity(&self) -> Result<&Identity> {
        self.identity.as_ref().ok_or(ClientError::NoIdentity)
    }

    pub fn username(&self) -> Result<&str> {
        self.identity().map(Identity::username)
    }

    /// Install a new identity and start a new generation.
    pub fn begin_session(&mut self, identity: Identity) -> u64 {
        self.identity = Some(identity);
        self.generation += 1;
        self.generation
    }

    /// Drop the identity and everything learned during the session.
    pub fn end_session(&mut self) {
        self.identity = None;
        self.conversations.clear_all();
        self.roster.clear();
        self.typing.clear();
        self.active_conversation = None;
        self.generation += 1;
    }

    /// Whether `generation` is still the current, signed-in session.
    pub fn is_current(&self, generation: u64) -> bool {
        self.identity.is_some() && self.generation == generation
    }
}
