//! Operations exposed to the user interface.
//!
//! Each sub-module groups related commands by domain. Every command takes
//! the [`ClientContext`](crate::context::ClientContext) it acts on.

pub mod channels;
pub mod identity;
pub mod messaging;
pub mod settings;
pub mod typing;
