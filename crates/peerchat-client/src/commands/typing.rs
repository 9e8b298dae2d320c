//! Typing indicators.
//!
//! An entry lasts for the configured window after its latest keystroke.
//! Expired entries are pruned on read, and a timer per keystroke prunes
//! them proactively so subscribers see the indicator go away.

use std::time::Instant;

use tracing::debug;

use peerchat_shared::types::ConversationKey;

use crate::context::ClientContext;
use crate::error::Result;
use crate::events::ClientEvent;

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

fn emit_typing(ctx: &ClientContext, key: &str, users: Vec<String>) {
    ctx.events().emit(ClientEvent::TypingChanged {
        key: ConversationKey::from(key),
        users,
    });
}

/// `username` is composing in `key`. Refreshes the entry if already present.
///
/// Must be called from within the Tokio runtime: it schedules the expiry.
pub fn register_typing(ctx: &ClientContext, key: &str, username: &str) -> Result<()> {
    let (users, generation) = {
        let mut state = ctx.lock_state()?;
        let now = now();
        state.typing.touch(key, username, now);
        (state.typing.typing(key, now), state.generation)
    };
    emit_typing(ctx, key, users);

    let ctx = ctx.clone();
    let window = ctx.config().typing_window;
    tokio::spawn(async move {
        tokio::time::sleep(window).await;
        let still_current = ctx
            .lock_state()
            .map(|state| state.generation == generation)
            .unwrap_or(false);
        if still_current {
            if let Err(e) = prune_typing(&ctx) {
                debug!(error = %e, "Typing expiry skipped");
            }
        }
    });
    Ok(())
}

/// `username` stopped composing in `key` (sent, or cleared the input).
pub fn stop_typing(ctx: &ClientContext, key: &str, username: &str) -> Result<()> {
    let users = {
        let mut state = ctx.lock_state()?;
        if !state.typing.stop(key, username) {
            return Ok(());
        }
        state.typing.typing(key, now())
    };
    emit_typing(ctx, key, users);
    Ok(())
}

/// Who is typing in `key` right now, sorted.
pub fn typing_users(ctx: &ClientContext, key: &str) -> Result<Vec<String>> {
    prune_typing(ctx)?;
    Ok(ctx.lock_state()?.typing.typing(key, now()))
}

/// Drop expired entries. Returns the conversations whose typing set changed.
pub fn prune_typing(ctx: &ClientContext) -> Result<Vec<ConversationKey>> {
    let changed = {
        let mut state = ctx.lock_state()?;
        let now = now();
        let changed = state.typing.prune(now);
        changed
            .into_iter()
            .map(|key| {
                let users = state.typing.typing(key.as_str(), now);
                (key, users)
            })
            .collect::<Vec<_>>()
    };

    for (key, users) in &changed {
        emit_typing(ctx, key.as_str(), users.clone());
    }
    Ok(changed.into_iter().map(|(key, _)| key).collect())
}
