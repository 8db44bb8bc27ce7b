use thiserror::Error;

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

impl Error {
    /// True for failures reported by the remote service or the network path,
    /// as opposed to errors raised locally before any request is issued.
    /// Tolerant CRUD variants degrade only on remote failures.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::Auth(_) | Error::Api { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
