use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} returned HTTP {status}")]
    Status { operation: &'static str, status: u16 },

    #[error("{operation} rejected with status `{status}`: {message}")]
    Rejected {
        operation: &'static str,
        status: String,
        message: String,
    },

    #[error("Invalid service URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, NetError>;
