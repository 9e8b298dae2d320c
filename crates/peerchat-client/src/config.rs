//! Client configuration loaded from environment variables.
//!
//! Every setting has a default that matches a local development setup, so
//! the client starts with nothing but a username.

use std::path::PathBuf;
use std::time::Duration;

use peerchat_shared::constants::{
    DEFAULT_DIRECTORY_URL, DEFAULT_MESSAGING_URL, DEFAULT_PEER_PORT, DEFAULT_POLL_INTERVAL_MS,
    TYPING_WINDOW_MS,
};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Env: `PEERCHAT_USERNAME`
    pub username: Option<String>,

    /// Env: `PEERCHAT_PASSWORD`
    pub password: Option<String>,

    /// Register the account before signing in.
    /// Env: `PEERCHAT_REGISTER` (true/false)
    /// Default: `false`
    pub register: bool,

    /// Base URL of the directory (tracker) service.
    /// Env: `DIRECTORY_URL`
    pub directory_url: String,

    /// Base URL of the peer-messaging service.
    /// Env: `MESSAGING_URL`
    pub messaging_url: String,

    /// Address announced for this peer.
    /// Env: `PEER_IP`
    /// Default: `0.0.0.0`
    pub peer_ip: String,

    /// Env: `PEER_PORT`
    /// Default: `9000`
    pub peer_port: u16,

    /// Delay between two synchronization cycles.
    /// Env: `POLL_INTERVAL_MS`
    /// Default: `2000`
    pub poll_interval: Duration,

    /// Inactivity after which a typing indicator expires.
    /// Env: `TYPING_WINDOW_MS`
    /// Default: `3000`
    pub typing_window: Duration,

    /// SQLite file for preferences. `None` uses the platform data dir.
    /// Env: `PREFERENCES_DB`
    pub preferences_db: Option<PathBuf>,

    /// Buffered events per subscriber before it starts lagging.
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            register: false,
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            messaging_url: DEFAULT_MESSAGING_URL.to_string(),
            peer_ip: "0.0.0.0".to_string(),
            peer_port: DEFAULT_PEER_PORT,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            typing_window: Duration::from_millis(TYPING_WINDOW_MS),
            preferences_db: None,
            event_capacity: 256,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup("PEERCHAT_USERNAME") {
            if !name.trim().is_empty() {
                config.username = Some(name.trim().to_string());
            }
        }

        config.password = lookup("PEERCHAT_PASSWORD");

        if let Some(val) = lookup("PEERCHAT_REGISTER") {
            config.register = val == "true" || val == "1";
        }

        if let Some(url) = lookup("DIRECTORY_URL") {
            config.directory_url = url;
        }

        if let Some(url) = lookup("MESSAGING_URL") {
            config.messaging_url = url;
        }

        if let Some(ip) = lookup("PEER_IP") {
            config.peer_ip = ip;
        }

        if let Some(val) = lookup("PEER_PORT") {
            match val.parse::<u16>() {
                Ok(port) if port != 0 => config.peer_port = port,
                _ => tracing::warn!(value = %val, "Invalid PEER_PORT, using default"),
            }
        }

        if let Some(val) = lookup("POLL_INTERVAL_MS") {
            match parse_millis(&val) {
                Some(interval) => config.poll_interval = interval,
                None => tracing::warn!(value = %val, "Invalid POLL_INTERVAL_MS, using default"),
            }
        }

        if let Some(val) = lookup("TYPING_WINDOW_MS") {
            match parse_millis(&val) {
                Some(window) => config.typing_window = window,
                None => tracing::warn!(value = %val, "Invalid TYPING_WINDOW_MS, using default"),
            }
        }

        if let Some(path) = lookup("PREFERENCES_DB") {
            if !path.is_empty() {
                config.preferences_db = Some(PathBuf::from(path));
            }
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }
}

fn parse_millis(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => None,
    }
}
