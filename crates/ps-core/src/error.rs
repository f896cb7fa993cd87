use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsError {
    /// A document API call failed: transport error or non-success status.
    /// Not retried here; retry policy belongs to the caller.
    #[error("downstream error: {0}")]
    Downstream(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// No credential is available for the requesting user.
    #[error("not connected: {0}")]
    NotConnected(String),

    /// A remote response lacked expected structure. Indicates an
    /// incompatible remote schema, not a transient fault.
    #[error("format error: {0}")]
    Format(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type PsResult<T> = Result<T, PsError>;
