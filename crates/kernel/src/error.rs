//! Editor error types.
//!
//! Authoring operations are tolerant: a stale block id is a no-op, not an
//! error. The variants below cover the conditions callers must see.

use lectern_sdk::types::{BlockId, BlockKind, DataError};
use thiserror::Error;

/// Errors raised by the authoring core.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("unknown block kind '{0}'")]
    UnknownKind(String),

    #[error("block '{0}' is not a split block")]
    NotASplit(BlockId),

    #[error("kind '{kind}' cannot be placed in a split slot")]
    KindNotAllowedInSlot { kind: BlockKind },

    #[error("block '{id}' ({kind}): patch rejected: {details}")]
    InvalidPatch {
        id: BlockId,
        kind: BlockKind,
        details: String,
    },

    #[error("template '{0}' not found")]
    UnknownTemplate(String),

    #[error("template catalog: {source_name}: {details}")]
    TemplateLoad {
        source_name: String,
        details: String,
    },

    #[error("file ingestion failed for {path}: {details}")]
    FileIngest { path: String, details: String },

    #[error("document data: {0}")]
    Data(#[from] DataError),

    #[error("serialization error")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using EditorError.
pub type EditorResult<T> = Result<T, EditorError>;
