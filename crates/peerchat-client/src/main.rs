use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use peerchat_client::commands::{identity, settings};
use peerchat_client::{init_tracing, ClientConfig, ClientContext, ClientEvent};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ClientConfig::from_env();
    let username = config
        .username
        .clone()
        .context("PEERCHAT_USERNAME is not set")?;
    let password = config.password.clone().unwrap_or_default();
    let register = config.register;

    info!(
        directory = %config.directory_url,
        messaging = %config.messaging_url,
        "Starting peerchat client"
    );

    let ctx = ClientContext::from_config(config).context("Failed to set up client")?;
    // Headless: there is never a focused view.
    settings::set_focused(&ctx, false);

    if register {
        identity::register_account(&ctx, &username, &password)
            .await
            .context("Registration failed")?;
    }

    let mut events = ctx.subscribe();
    identity::sign_in(&ctx, &username, &password)
        .await
        .context("Sign-in failed")?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
            event = events.recv() => match event {
                Ok(ClientEvent::MessageAppended { key, message }) => {
                    info!(conversation = %key, from = %message.sender, body = %message.body, "Message");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    identity::sign_out(&ctx).await?;
    info!("Client stopped");
    Ok(())
}
