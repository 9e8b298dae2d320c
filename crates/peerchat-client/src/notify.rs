//! Audible and desktop cues for newly arrived messages.
//!
//! Preferences are read on every dispatch so a toggle applies to the next
//! message. Nothing here fails outward: playback and notification errors are
//! logged and dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use peerchat_media::{synthesize_chime, AudioError, ChimeConfig, ChimePlayer};
use peerchat_shared::types::ConversationKind;
use peerchat_store::{PreferenceSnapshot, Preferences};

use crate::error::Result;

/// Where desktop notifications go.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Writes notifications to the log. Used when no desktop integration exists.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        info!(title, body, "Notification");
        Ok(())
    }
}

pub struct NotificationDispatcher {
    preferences: Arc<Mutex<Preferences>>,
    sink: Arc<dyn NotificationSink>,
    player: Arc<dyn ChimePlayer>,
    chime: ChimeConfig,
    samples: Arc<[f32]>,
    focused: AtomicBool,
}

impl NotificationDispatcher {
    pub fn new(
        preferences: Arc<Mutex<Preferences>>,
        sink: Arc<dyn NotificationSink>,
        player: Arc<dyn ChimePlayer>,
    ) -> Self {
        let chime = ChimeConfig::default();
        let samples = synthesize_chime(&chime).into();
        Self {
            preferences,
            sink,
            player,
            chime,
            samples,
            focused: AtomicBool::new(true),
        }
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
        debug!(focused, "View focus changed");
    }

    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    /// React to one new message from someone else in conversation `key`.
    pub async fn dispatch(&self, key: &str, kind: ConversationKind, sender: &str, body: &str) {
        let prefs = self.read_preferences();

        if prefs.sound_enabled {
            self.play_chime().await;
        }

        if prefs.notifications_enabled && !self.is_focused() {
            let title = kind.title(key);
            if let Err(e) = self.sink.notify(&title, body).await {
                warn!(key, sender, error = %e, "Notification failed");
            }
        }
    }

    fn read_preferences(&self) -> PreferenceSnapshot {
        let prefs = match self.preferences.lock() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Preferences lock poisoned, using defaults");
                return PreferenceSnapshot::default();
            }
        };
        prefs.snapshot().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read preferences, using defaults");
            PreferenceSnapshot::default()
        })
    }

    async fn play_chime(&self) {
        let player = self.player.clone();
        let samples = self.samples.clone();
        let config = self.chime.clone();

        match tokio::task::spawn_blocking(move || player.play(&samples, &config)).await {
            Ok(Ok(())) => debug!("Notification tone played"),
            Ok(Err(AudioError::PlaybackUnavailable)) => debug!("Notification tone skipped"),
            Ok(Err(e)) => warn!(error = %e, "Notification tone failed"),
            Err(e) => warn!(error = %e, "Notification tone task failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use peerchat_store::Database;

    use super::*;
    use crate::error::ClientError;

    #[derive(Default)]
    struct CountingPlayer {
        plays: AtomicUsize,
        fail: bool,
    }

    impl ChimePlayer for CountingPlayer {
        fn play(&self, samples: &[f32], _config: &ChimeConfig) -> std::result::Result<(), AudioError> {
            assert!(!samples.is_empty());
            self.plays.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AudioError::NoOutputDevice)
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn notify(&self, title: &str, body: &str) -> Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
            if self.fail {
                return Err(ClientError::Notification("denied".into()));
            }
            Ok(())
        }
    }

    fn dispatcher(
        player: Arc<CountingPlayer>,
        sink: Arc<RecordingSink>,
    ) -> (NotificationDispatcher, Arc<Mutex<Preferences>>) {
        let prefs = Arc::new(Mutex::new(Preferences::new(
            Database::open_in_memory().unwrap(),
        )));
        (
            NotificationDispatcher::new(prefs.clone(), sink, player),
            prefs,
        )
    }

    #[tokio::test]
    async fn test_defaults_play_sound_without_notification() {
        let player = Arc::new(CountingPlayer::default());
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, _) = dispatcher(player.clone(), sink.clone());
        dispatcher.set_focused(false);

        dispatcher
            .dispatch("bob", ConversationKind::Direct, "bob", "hey")
            .await;

        assert_eq!(player.plays.load(Ordering::SeqCst), 1);
        assert!(sink.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notification_only_when_unfocused() {
        let player = Arc::new(CountingPlayer::default());
        let sink = Arc::new(RecordingSink::default());
        let (dispatcher, prefs) = dispatcher(player.clone(), sink.clone());
        prefs
            .lock()
            .unwrap()
            .apply(PreferenceSnapshot {
                sound_enabled: false,
                notifications_enabled: true,
            })
            .unwrap();

        dispatcher
            .dispatch("general", ConversationKind::Channel, "carol", "yo")
            .await;
        assert!(sink.seen.lock().unwrap().is_empty());

        dispatcher.set_focused(false);
        dispatcher
            .dispatch("general", ConversationKind::Channel, "carol", "yo")
            .await;

        let seen = sink.seen.lock().unwrap().clone();
        assert_eq!(seen, [("#general".to_string(), "yo".to_string())]);
        assert_eq!(player.plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let player = Arc::new(CountingPlayer {
            fail: true,
            ..Default::default()
        });
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let (dispatcher, prefs) = dispatcher(player.clone(), sink.clone());
        prefs.lock().unwrap().set_notifications_enabled(true).unwrap();
        dispatcher.set_focused(false);

        dispatcher
            .dispatch("bob", ConversationKind::Direct, "bob", "hey")
            .await;

        assert_eq!(player.plays.load(Ordering::SeqCst), 1);
        assert_eq!(sink.seen.lock().unwrap().len(), 1);
    }
}
