// HTTP clients for the directory (tracker) and peer-messaging services.

pub mod directory;
pub mod error;
pub mod http;
pub mod messaging;

pub use directory::{DirectoryService, HttpDirectoryClient};
pub use error::{NetError, Result};
pub use http::host_and_port;
pub use messaging::{HttpMessagingClient, MessagingEndpoint, PendingBatch};
