use tracing::{debug, info, warn};

use peerchat_shared::protocol::{ChannelMembershipRequest, ConnectPeerRequest, GetListRequest};
use peerchat_shared::types::{ConversationKey, ConversationKind, Peer};

use crate::context::ClientContext;
use crate::error::{ClientError, Result};
use crate::events::ClientEvent;

fn membership(ctx: &ClientContext, channel: &str) -> Result<ChannelMembershipRequest> {
    let username = ctx.username()?.ok_or(ClientError::NoIdentity)?;
    Ok(ChannelMembershipRequest {
        username,
        channel: channel.to_string(),
    })
}

/// Join `channel` on both services. The conversation exists (empty) from
/// here on. Returns the channel members.
pub async fn join_channel(ctx: &ClientContext, channel: &str) -> Result<Vec<String>> {
    let request = membership(ctx, channel)?;
    let members = ctx.directory().add_to_channel(&request).await?;
    if let Err(e) = ctx.messaging().join_channel(&request).await {
        warn!(channel, error = %e, "Messaging join failed, withdrawing directory membership");
        if let Err(undo) = ctx.directory().remove_from_channel(&request).await {
            warn!(channel, error = %undo, "Directory still lists us as a channel member");
        }
        return Err(e.into());
    }

    let roster = {
        let mut state = ctx.lock_state()?;
        state.roster.join_channel(channel, members.iter().cloned());
        state.conversations.ensure(channel);
        (state.roster.peers().len(), state.roster.channels())
    };

    info!(channel, members = members.len(), "Joined channel");
    emit_roster(ctx, roster);
    Ok(members)
}

/// Leave `channel`; its conversation and read position are dropped.
pub async fn leave_channel(ctx: &ClientContext, channel: &str) -> Result<()> {
    let request = membership(ctx, channel)?;
    ctx.directory().remove_from_channel(&request).await?;

    let roster = {
        let mut state = ctx.lock_state()?;
        state.roster.leave_channel(channel);
        state.conversations.remove(channel);
        state.typing.forget(channel);
        if state
            .active_conversation
            .as_ref()
            .is_some_and(|key| key.as_str() == channel)
        {
            state.active_conversation = None;
        }
        (state.roster.peers().len(), state.roster.channels())
    };

    info!(channel, "Left channel");
    ctx.events().emit(ClientEvent::ConversationRemoved {
        key: ConversationKey::from(channel),
    });
    emit_roster(ctx, roster);
    Ok(())
}

/// Replace the peer list with the directory's current view and refresh the
/// member lists of joined channels.
pub async fn refresh_roster(ctx: &ClientContext) -> Result<Vec<Peer>> {
    let username = ctx.username()?.ok_or(ClientError::NoIdentity)?;
    let list = ctx.directory().get_list(&GetListRequest::default()).await?;

    let peers: Vec<Peer> = list
        .peers
        .into_iter()
        .filter(|p| p.username != username)
        .collect();

    let roster = {
        let mut state = ctx.lock_state()?;
        state.roster.replace_peers(peers.clone());
        for (channel, members) in list.channels {
            state.roster.set_members(&channel, members);
        }
        (state.roster.peers().len(), state.roster.channels())
    };

    debug!(peers = peers.len(), "Roster refreshed");
    emit_roster(ctx, roster);
    Ok(peers)
}

/// Members of a joined channel as last reported by the directory.
pub fn channel_members(ctx: &ClientContext, channel: &str) -> Result<Vec<String>> {
    Ok(ctx.lock_state()?.roster.members(channel))
}

/// Whether `key` names a joined channel or a direct conversation.
pub fn conversation_kind(ctx: &ClientContext, key: &str) -> Result<ConversationKind> {
    Ok(ctx.lock_state()?.roster.kind_of(key))
}

/// Ask the messaging service to open a connection to a known peer.
pub async fn connect_peer(ctx: &ClientContext, peer: &str) -> Result<()> {
    let (username, target) = {
        let state = ctx.lock_state()?;
        let username = state.username()?.to_string();
        let target = state
            .roster
            .peer(peer)
            .cloned()
            .ok_or_else(|| ClientError::UnknownPeer(peer.to_string()))?;
        (username, target)
    };

    ctx.messaging()
        .connect_peer(&ConnectPeerRequest {
            username,
            peer_username: target.username.clone(),
            peer_ip: target.ip.clone(),
            peer_port: target.port,
        })
        .await?;

    info!(peer = %target.username, addr = %target.address(), "Connected to peer");
    Ok(())
}

fn emit_roster(ctx: &ClientContext, (peer_count, channels): (usize, Vec<String>)) {
    ctx.events().emit(ClientEvent::RosterUpdated {
        peer_count,
        channels,
    });
}
