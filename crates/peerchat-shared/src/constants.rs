/// Application name
pub const APP_NAME: &str = "peerchat";

/// Status string the collaborator services report on success
pub const STATUS_SUCCESS: &str = "success";

/// Channel tag that designates a direct (one-to-one) message
pub const DIRECT_CHANNEL: &str = "direct";

/// Interval between two synchronization cycles, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Inactivity window after which a typing indicator expires, in milliseconds
pub const TYPING_WINDOW_MS: u64 = 3_000;

/// Default directory (tracker) service URL
pub const DEFAULT_DIRECTORY_URL: &str = "http://127.0.0.1:8001";

/// Default peer-messaging (web peer) service URL
pub const DEFAULT_MESSAGING_URL: &str = "http://127.0.0.1:8002";

/// Default locally chosen peer port
pub const DEFAULT_PEER_PORT: u16 = 9000;

/// Preference keys (boolean-as-string values)
pub const PREF_SOUND_ENABLED: &str = "soundEnabled";
pub const PREF_NOTIFICATIONS_ENABLED: &str = "browserNotificationsEnabled";

/// Preference defaults
pub const DEFAULT_SOUND_ENABLED: bool = true;
pub const DEFAULT_NOTIFICATIONS_ENABLED: bool = false;
