use thiserror::Error;

/// Error taxonomy surfaced by the store, storage and service layers.
///
/// Nothing here is retried automatically; every variant maps to a single
/// HTTP status at the API boundary.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    /// Deliberately identical for "no such user" and "wrong password" so
    /// a caller cannot tell which case occurred.
    #[error("Wrong username or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    /// The database or the file-storage collaborator is unreachable or
    /// misbehaving.
    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
