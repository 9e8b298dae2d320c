use std::sync::PoisonError;

use thiserror::Error;

use peerchat_net::NetError;
use peerchat_shared::error::IdentityError;
use peerchat_store::StoreError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Net(#[from] NetError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Not signed in")]
    NoIdentity,

    #[error("Already signed in as {0}")]
    AlreadySignedIn(String),

    #[error("Message body is empty")]
    EmptyMessage,

    #[error("Unknown peer: {0}")]
    UnknownPeer(String),

    #[error("Notification failed: {0}")]
    Notification(String),
}

impl<T> From<PoisonError<T>> for ClientError {
    fn from(e: PoisonError<T>) -> Self {
        Self::LockPoisoned(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
