pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod notify;
pub mod state;
pub mod sync;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use context::ClientContext;
pub use error::{ClientError, Result};
pub use events::ClientEvent;
pub use sync::{CycleOutcome, SyncState};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling it again is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "peerchat_client=debug,peerchat_net=debug,peerchat_store=info,peerchat_media=info,warn",
        )
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
