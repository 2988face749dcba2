//! Errors callers are expected to match on.
//!
//! Everything else (I/O, serialization, misconfiguration) travels as
//! `anyhow::Error` with context attached.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("recommendation {0} not found")]
    RecordNotFound(String),

    #[error("model '{0}' not found")]
    ModelNotFound(String),

    #[error("recommendation {id} changed since it was read (expected version {expected}, found {found})")]
    Conflict { id: String, expected: u32, found: u32 },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
