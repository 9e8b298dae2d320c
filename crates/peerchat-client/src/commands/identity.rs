use tracing::{info, warn};

use peerchat_net::host_and_port;
use peerchat_shared::identity::Identity;
use peerchat_shared::protocol::{CredentialsRequest, InitPeerRequest, SubmitInfoRequest};

use crate::commands::channels;
use crate::context::ClientContext;
use crate::error::{ClientError, Result};

fn credentials(username: &str, password: &str) -> CredentialsRequest {
    CredentialsRequest {
        username: username.trim().to_string(),
        password: password.to_string(),
    }
}

/// Create an account on the directory service.
pub async fn register_account(ctx: &ClientContext, username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(peerchat_shared::error::IdentityError::EmptyUsername.into());
    }
    ctx.directory()
        .register(&credentials(username, password))
        .await?;
    Ok(())
}

/// Log in, bring up the service-side peer, announce it, and start syncing.
pub async fn sign_in(ctx: &ClientContext, username: &str, password: &str) -> Result<Identity> {
    if let Some(current) = ctx.username()? {
        return Err(ClientError::AlreadySignedIn(current));
    }

    let config = ctx.config();
    let identity = Identity::new(
        username,
        config.directory_url.as_str(),
        config.messaging_url.as_str(),
        config.peer_port,
    )?;

    ctx.directory()
        .login(&credentials(identity.username(), password))
        .await?;

    let (tracker_ip, tracker_port) = host_and_port(identity.directory_url())?;
    ctx.messaging()
        .init_peer(&InitPeerRequest {
            username: identity.username().to_string(),
            peer_ip: config.peer_ip.clone(),
            peer_port: identity.port(),
            tracker_ip,
            tracker_port,
        })
        .await?;

    ctx.directory()
        .submit_info(&SubmitInfoRequest {
            username: identity.username().to_string(),
            ip: config.peer_ip.clone(),
            port: identity.port(),
            channels: Vec::new(),
        })
        .await?;

    let generation = {
        let mut state = ctx.lock_state()?;
        if let Some(current) = &state.identity {
            return Err(ClientError::AlreadySignedIn(current.username().to_string()));
        }
        state.begin_session(identity.clone())
    };

    if let Err(e) = channels::refresh_roster(ctx).await {
        warn!(error = %e, "Initial roster refresh failed");
    }

    ctx.start_sync()?;
    info!(username = %identity.username(), generation, "Signed in");
    Ok(identity)
}

/// Stop syncing and drop every piece of session state.
pub async fn sign_out(ctx: &ClientContext) -> Result<()> {
    ctx.stop_sync()?;

    let username = {
        let mut state = ctx.lock_state()?;
        let username = state.identity.as_ref().map(|id| id.username().to_string());
        state.end_session();
        username
    };

    match username {
        Some(username) => info!(username = %username, "Signed out"),
        None => info!("Sign-out with no active session"),
    }
    Ok(())
}
