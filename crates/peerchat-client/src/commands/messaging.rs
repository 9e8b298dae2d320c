//! Sending, reading and reacting.
//!
//! Sends are optimistic: the message is appended locally before the
//! request goes out and stays there whether or not the request succeeds.
//! A failed send is logged and returned to the caller.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use uuid::Uuid;

use peerchat_shared::constants::DIRECT_CHANNEL;
use peerchat_shared::protocol::{BroadcastRequest, SendPeerRequest};
use peerchat_shared::types::{ConversationKey, ConversationKind};
use peerchat_store::Message;

use crate::context::ClientContext;
use crate::error::{ClientError, Result};
use crate::events::ClientEvent;

/// Append a locally authored message to `key` and announce it.
fn append_outgoing(ctx: &ClientContext, key: &str, body: &str, channel: Option<&str>) -> Result<Message> {
    if body.trim().is_empty() {
        return Err(ClientError::EmptyMessage);
    }

    let message = {
        let mut state = ctx.lock_state()?;
        let message = Message::outgoing(state.username()?, body, channel);
        state.conversations.append(key, message.clone());
        message
    };

    ctx.events().emit(ClientEvent::MessageAppended {
        key: ConversationKey::from(key),
        message: message.clone(),
    });
    Ok(message)
}

/// Send a direct message to `peer`.
pub async fn send_direct(ctx: &ClientContext, peer: &str, body: &str) -> Result<Message> {
    let message = append_outgoing(ctx, peer, body, None)?;

    let request = SendPeerRequest {
        username: message.sender.clone(),
        peer_username: peer.to_string(),
        message: message.body.clone(),
        channel: DIRECT_CHANNEL.to_string(),
    };
    if let Err(e) = ctx.messaging().send_direct(&request).await {
        warn!(peer, error = %e, "Direct send failed, local copy kept");
        return Err(e.into());
    }

    debug!(peer, "Direct message sent");
    Ok(message)
}

/// Broadcast a message to every member of `channel`.
pub async fn send_to_channel(ctx: &ClientContext, channel: &str, body: &str) -> Result<Message> {
    let message = append_outgoing(ctx, channel, body, Some(channel))?;

    let request = BroadcastRequest {
        username: message.sender.clone(),
        message: message.body.clone(),
        channel: channel.to_string(),
    };
    match ctx.messaging().broadcast(&request).await {
        Ok(sent_count) => {
            debug!(channel, sent_count, "Channel message sent");
            Ok(message)
        }
        Err(e) => {
            warn!(channel, error = %e, "Channel send failed, local copy kept");
            Err(e.into())
        }
    }
}

/// Everything currently in `key` counts as read.
pub fn mark_read(ctx: &ClientContext, key: &str) -> Result<()> {
    ctx.lock_state()?.conversations.mark_read(key);
    Ok(())
}

/// Switch the conversation on screen. The newly active one is marked read.
pub fn set_active_conversation(ctx: &ClientContext, key: Option<&str>) -> Result<()> {
    let mut state = ctx.lock_state()?;
    if let Some(key) = key {
        state.conversations.mark_read(key);
    }
    state.active_conversation = key.map(ConversationKey::from);
    Ok(())
}

pub fn unread_count(ctx: &ClientContext, key: &str) -> Result<usize> {
    let state = ctx.lock_state()?;
    Ok(state.conversations.unread_count(key, state.username()?))
}

pub fn total_unread(ctx: &ClientContext) -> Result<usize> {
    let state = ctx.lock_state()?;
    Ok(state.conversations.total_unread(state.username()?))
}

/// Unread counts of the conversations that have any.
pub fn unread_summary(ctx: &ClientContext) -> Result<BTreeMap<ConversationKey, usize>> {
    let state = ctx.lock_state()?;
    Ok(state.conversations.unread_summary(state.username()?))
}

/// Conversation keys, sorted, each with whether it is a channel.
pub fn list_conversations(ctx: &ClientContext) -> Result<Vec<(ConversationKey, ConversationKind)>> {
    let state = ctx.lock_state()?;
    Ok(state
        .conversations
        .keys()
        .into_iter()
        .map(|key| {
            let kind = state.roster.kind_of(key.as_str());
            (key, kind)
        })
        .collect())
}

/// Empty a conversation and reset its read position.
pub fn clear_conversation(ctx: &ClientContext, key: &str) -> Result<()> {
    ctx.lock_state()?.conversations.clear(key);
    debug!(key, "Conversation cleared");
    Ok(())
}

/// Toggle the local user's `emoji` reaction on a message. Returns `false`
/// when the message is unknown.
pub fn toggle_reaction(ctx: &ClientContext, key: &str, message_id: Uuid, emoji: &str) -> Result<bool> {
    let mut state = ctx.lock_state()?;
    let username = state.username()?.to_string();
    Ok(state
        .conversations
        .toggle_reaction(key, message_id, emoji, &username))
}
