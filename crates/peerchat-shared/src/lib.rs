//! Types shared by every peerchat crate: identities, roster entries, the JSON
//! records exchanged with the directory and peer-messaging services, and the
//! protocol constants.

pub mod constants;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod types;
