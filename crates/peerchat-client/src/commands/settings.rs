use tracing::info;

use peerchat_store::PreferenceSnapshot;

use crate::context::ClientContext;
use crate::error::Result;

pub fn get_preferences(ctx: &ClientContext) -> Result<PreferenceSnapshot> {
    Ok(ctx.preferences().lock()?.snapshot()?)
}

/// Persist both toggles. The next dispatched message uses them.
pub fn update_preferences(ctx: &ClientContext, snapshot: PreferenceSnapshot) -> Result<()> {
    ctx.preferences().lock()?.apply(snapshot)?;
    info!(
        sound = snapshot.sound_enabled,
        notifications = snapshot.notifications_enabled,
        "Preferences updated"
    );
    Ok(())
}

/// Whether the conversation view has focus. Desktop notifications are only
/// shown while it does not.
pub fn set_focused(ctx: &ClientContext, focused: bool) {
    ctx.dispatcher().set_focused(focused);
}
