//! The explicit application context.
//!
//! One [`ClientContext`] is one client session holder: it owns the stores,
//! the service clients, the dispatcher and the sync loop. Clones share the
//! same session. Tests build as many isolated contexts as they like.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use peerchat_media::default_player;
use peerchat_net::{DirectoryService, HttpDirectoryClient, HttpMessagingClient, MessagingEndpoint};
use peerchat_store::{Database, Message, Preferences};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::events::{ClientEvent, EventBus};
use crate::notify::{NotificationDispatcher, NotificationSink, TracingNotifier};
use crate::state::AppState;
use crate::sync::{self, CycleOutcome, SyncLoop, SyncState};

#[derive(Clone)]
pub struct ClientContext {
    config: Arc<ClientConfig>,
    state: Arc<Mutex<AppState>>,
    messaging: Arc<dyn MessagingEndpoint>,
    directory: Arc<dyn DirectoryService>,
    preferences: Arc<Mutex<Preferences>>,
    dispatcher: Arc<NotificationDispatcher>,
    events: EventBus,
    sync: Arc<Mutex<SyncLoop>>,
    in_flight: Arc<AtomicBool>,
}

impl ClientContext {
    pub fn new(
        config: ClientConfig,
        messaging: Arc<dyn MessagingEndpoint>,
        directory: Arc<dyn DirectoryService>,
        preferences: Preferences,
        sink: Arc<dyn NotificationSink>,
        player: Arc<dyn peerchat_media::ChimePlayer>,
    ) -> Self {
        let preferences = Arc::new(Mutex::new(preferences));
        let dispatcher = NotificationDispatcher::new(preferences.clone(), sink, player);
        Self {
            state: Arc::new(Mutex::new(AppState::new(config.typing_window))),
            events: EventBus::new(config.event_capacity),
            config: Arc::new(config),
            messaging,
            directory,
            preferences,
            dispatcher: Arc::new(dispatcher),
            sync: Arc::new(Mutex::new(SyncLoop::new())),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wire the HTTP service clients, the preference database and the
    /// default notification outputs.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let messaging = HttpMessagingClient::new(&config.messaging_url)?;
        let directory = HttpDirectoryClient::new(&config.directory_url)?;
        let db = match &config.preferences_db {
            Some(path) => Database::open_at(path)?,
            None => Database::new()?,
        };

        Ok(Self::new(
            config,
            Arc::new(messaging),
            Arc::new(directory),
            Preferences::new(db),
            Arc::new(TracingNotifier),
            Arc::from(default_player()),
        ))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn sync_state(&self) -> Result<SyncState> {
        Ok(self.sync.lock()?.state())
    }

    /// Username of the signed-in identity.
    pub fn username(&self) -> Result<Option<String>> {
        Ok(self
            .lock_state()?
            .identity
            .as_ref()
            .map(|id| id.username().to_string()))
    }

    /// Snapshot of one conversation, in arrival order.
    pub fn messages(&self, key: &str) -> Result<Vec<Message>> {
        Ok(self.lock_state()?.conversations.messages(key).to_vec())
    }

    /// Run one synchronization cycle now, outside the timer.
    pub async fn sync_once(&self) -> CycleOutcome {
        sync::run_cycle(self, None).await
    }

    pub(crate) fn lock_state(&self) -> Result<MutexGuard<'_, AppState>> {
        Ok(self.state.lock()?)
    }

    /// `(username, generation)` of the current session, if signed in.
    pub(crate) fn session(&self) -> Result<Option<(String, u64)>> {
        let state = self.lock_state()?;
        Ok(state
            .identity
            .as_ref()
            .map(|id| (id.username().to_string(), state.generation)))
    }

    pub(crate) fn messaging(&self) -> &dyn MessagingEndpoint {
        self.messaging.as_ref()
    }

    pub(crate) fn directory(&self) -> &dyn DirectoryService {
        self.directory.as_ref()
    }

    pub(crate) fn preferences(&self) -> &Mutex<Preferences> {
        &self.preferences
    }

    pub(crate) fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.events
    }

    pub(crate) fn in_flight(&self) -> &AtomicBool {
        &self.in_flight
    }

    /// Idle/Stopped → Active.
    pub(crate) fn start_sync(&self) -> Result<bool> {
        let started = self.sync.lock()?.start(self.clone());
        if started {
            self.events.emit(ClientEvent::SyncStateChanged {
                state: SyncState::Active,
            });
        }
        Ok(started)
    }

    /// Active → Stopped.
    pub(crate) fn stop_sync(&self) -> Result<bool> {
        let stopped = self.sync.lock()?.stop();
        if stopped {
            self.events.emit(ClientEvent::SyncStateChanged {
                state: SyncState::Stopped,
            });
        }
        Ok(stopped)
    }
}
