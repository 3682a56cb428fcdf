//! File ingestion for media blocks.

mod ingest;

pub use ingest::{
    ALLOWED_MIME_TYPES, DataUri, MAX_FILE_SIZE, accepts, apply_ingested, apply_ingested_to_slot,
    ingest_file,
};
