use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Inbound record is missing field `{0}`")]
    MissingField(&'static str),

    #[error("Service reported status `{status}`: {message}")]
    Rejected { status: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Peer port must be non-zero")]
    InvalidPort,

    #[error("Service URL must not be empty")]
    EmptyUrl,
}
