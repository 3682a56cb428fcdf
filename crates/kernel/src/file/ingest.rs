//! File ingestion.
//!
//! Turns a locally chosen file into a `data:` URI that media blocks can embed
//! directly. Reading is the one asynchronous step in the authoring core; the
//! result is applied with an ordinary `update_data`, so the last ingestion to
//! finish wins.

use std::fmt;
use std::path::Path;

use base64::Engine;
use lectern_sdk::types::{BlockId, BlockKind, ImageItem, LeafData};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::content::document::Document;
use crate::content::split::{self, Slot};
use crate::error::{EditorError, EditorResult};

/// Maximum file size (10 MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// MIME types accepted for ingestion.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    // Images
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    // Video
    "video/mp4",
    "video/webm",
    // Audio
    "audio/mpeg",
    "audio/ogg",
    "audio/x-wav",
    // Documents
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
    "text/csv",
    // Archives
    "application/zip",
    "application/gzip",
];

/// Fallback for formats `infer` cannot sniff from content (text, SVG).
fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/x-wav",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        _ => return None,
    };
    Some(mime)
}

/// Whether a block of `kind` can hold a file of `mime_type`.
pub fn accepts(kind: BlockKind, mime_type: &str) -> bool {
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return false;
    }
    match kind {
        BlockKind::Image => mime_type.starts_with("image/"),
        BlockKind::Video => mime_type.starts_with("video/"),
        BlockKind::Audio => mime_type.starts_with("audio/"),
        BlockKind::File => true,
        _ => false,
    }
}

/// A file read into memory and encoded for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUri {
    /// File name without directories.
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    /// `data:<mime>;base64,<payload>`
    pub uri: String,
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

fn ingest_error(path: &Path, details: impl ToString) -> EditorError {
    EditorError::FileIngest {
        path: path.display().to_string(),
        details: details.to_string(),
    }
}

/// Read `path` and encode it as a data URI.
///
/// Fails if the file is larger than `max_bytes` or its type is not in
/// [`ALLOWED_MIME_TYPES`]. There is no timeout or cancellation.
pub async fn ingest_file(path: &Path, max_bytes: usize) -> EditorResult<DataUri> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| ingest_error(path, e))?;
    if !metadata.is_file() {
        return Err(ingest_error(path, "not a regular file"));
    }
    if metadata.len() > max_bytes as u64 {
        return Err(ingest_error(
            path,
            format!(
                "file too large: {} bytes (max {max_bytes} bytes)",
                metadata.len()
            ),
        ));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ingest_error(path, e))?;
    // The file may have grown between the metadata check and the read.
    if bytes.len() > max_bytes {
        return Err(ingest_error(
            path,
            format!("file too large: {} bytes (max {max_bytes} bytes)", bytes.len()),
        ));
    }

    let mime_type = infer::get(&bytes)
        .map(|t| t.mime_type())
        .or_else(|| mime_from_extension(path))
        .ok_or_else(|| ingest_error(path, "could not determine file type"))?;
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(ingest_error(path, format!("file type not allowed: {mime_type}")));
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);

    info!(file = %name, mime = mime_type, size = bytes.len(), "file ingested");
    Ok(DataUri {
        name,
        mime_type: mime_type.to_string(),
        size: bytes.len() as u64,
        uri: format!("data:{mime_type};base64,{encoded}"),
    })
}

/// Patch that writes `file` into the field a payload of this kind keeps it in.
fn ingest_patch(leaf: &LeafData, file: &DataUri) -> Option<Value> {
    let patch = match leaf {
        // The editor surfaces only the first image; the rest are kept.
        LeafData::Image(image) => {
            let mut items = image.items.clone();
            match items.first_mut() {
                Some(first) => first.url = file.uri.clone(),
                None => items.push(ImageItem {
                    url: file.uri.clone(),
                    caption: String::new(),
                }),
            }
            json!({ "items": items })
        }
        LeafData::Video(_) | LeafData::Audio(_) => json!({ "url": file.uri }),
        LeafData::File(_) => json!({
            "url": file.uri,
            "name": file.name,
            "mimeType": file.mime_type,
            "size": file.size,
        }),
        _ => return None,
    };
    Some(patch)
}

fn check_accepts(kind: BlockKind, file: &DataUri) -> EditorResult<()> {
    if accepts(kind, &file.mime_type) {
        return Ok(());
    }
    Err(EditorError::FileIngest {
        path: file.name.clone(),
        details: format!("a {kind} block cannot hold a {} file", file.mime_type),
    })
}

/// Write an ingested file into block `id`. A removed block is ignored.
pub fn apply_ingested(doc: &mut Document, id: &BlockId, file: &DataUri) -> EditorResult<()> {
    let Some(leaf) = doc.get(id).and_then(|b| b.as_leaf()) else {
        debug!(%id, "apply_ingested: block is gone or is a split");
        return Ok(());
    };
    check_accepts(leaf.kind(), file)?;
    let Some(patch) = ingest_patch(leaf, file) else {
        return Ok(());
    };
    doc.update_data(id, patch)
}

/// Write an ingested file into a populated split slot.
pub fn apply_ingested_to_slot(
    doc: &mut Document,
    id: &BlockId,
    slot: Slot,
    file: &DataUri,
) -> EditorResult<()> {
    let Some(sub) = split::slot(doc, id, slot) else {
        debug!(%id, %slot, "apply_ingested: slot is empty or gone");
        return Ok(());
    };
    check_accepts(sub.kind(), file)?;
    let Some(patch) = ingest_patch(&sub.data, file) else {
        return Ok(());
    };
    split::update_slot_data(doc, id, slot, patch)
}
