//! File ingestion integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use lectern_kernel::content::Document;
use lectern_kernel::content::split::{self, Slot};
use lectern_kernel::error::EditorError;
use lectern_kernel::file::{MAX_FILE_SIZE, apply_ingested, apply_ingested_to_slot, ingest_file};
use lectern_sdk::types::{BlockKind, LeafData};
use lectern_test_utils::TestDir;

const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

#[tokio::test]
async fn png_becomes_data_uri() {
    let dir = TestDir::new("ingest_png");
    let path = dir.write("cell.png", PNG_HEADER);

    let uri = ingest_file(&path, MAX_FILE_SIZE).await.unwrap();
    assert_eq!(uri.name, "cell.png");
    assert_eq!(uri.mime_type, "image/png");
    assert_eq!(uri.size, PNG_HEADER.len() as u64);
    assert!(uri.uri.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn text_falls_back_to_extension() {
    let dir = TestDir::new("ingest_txt");
    let path = dir.write("notes.txt", "plain notes");
    let uri = ingest_file(&path, MAX_FILE_SIZE).await.unwrap();
    assert_eq!(uri.mime_type, "text/plain");
    assert_eq!(uri.uri, "data:text/plain;base64,cGxhaW4gbm90ZXM=");
}

#[tokio::test]
async fn oversized_and_unknown_files_are_rejected() {
    let dir = TestDir::new("ingest_reject");
    let big = dir.write("big.txt", vec![b'a'; 64]);
    assert!(matches!(
        ingest_file(&big, 16).await,
        Err(EditorError::FileIngest { .. })
    ));

    let odd = dir.write("payload.bin", [0u8, 1, 2, 3]);
    assert!(matches!(
        ingest_file(&odd, MAX_FILE_SIZE).await,
        Err(EditorError::FileIngest { .. })
    ));

    let missing = dir.join("missing.png");
    assert!(ingest_file(&missing, MAX_FILE_SIZE).await.is_err());
}

#[tokio::test]
async fn ingested_file_lands_in_the_right_field() {
    let dir = TestDir::new("ingest_apply");
    let png = ingest_file(&dir.write("a.png", PNG_HEADER), MAX_FILE_SIZE).await.unwrap();
    let txt = ingest_file(&dir.write("a.txt", "hello"), MAX_FILE_SIZE).await.unwrap();

    let mut doc = Document::new();
    let image = doc.insert(BlockKind::Image, None);
    let file = doc.insert(BlockKind::File, None);

    apply_ingested(&mut doc, &image, &png).unwrap();
    apply_ingested(&mut doc, &file, &txt).unwrap();

    let Some(LeafData::Image(data)) = doc.get(&image).unwrap().as_leaf() else {
        panic!("expected image");
    };
    assert_eq!(data.items[0].url, png.uri);
    let Some(LeafData::File(data)) = doc.get(&file).unwrap().as_leaf() else {
        panic!("expected file");
    };
    assert_eq!(data.name, "a.txt");
    assert_eq!(data.mime_type, "text/plain");
    assert_eq!(data.size, 5);

    assert!(matches!(
        apply_ingested(&mut doc, &image, &txt),
        Err(EditorError::FileIngest { .. })
    ));
}

#[tokio::test]
async fn ingested_image_fills_a_slot() {
    let dir = TestDir::new("ingest_slot");
    let png = ingest_file(&dir.write("b.png", PNG_HEADER), MAX_FILE_SIZE).await.unwrap();

    let mut doc = Document::new();
    let id = doc.insert(BlockKind::Split, None);
    split::populate_slot(&mut doc, &id, Slot::Left, BlockKind::Image).unwrap();
    apply_ingested_to_slot(&mut doc, &id, Slot::Left, &png).unwrap();

    let LeafData::Image(data) = &split::slot(&doc, &id, Slot::Left).unwrap().data else {
        panic!("expected image");
    };
    assert_eq!(data.items[0].url, png.uri);
}
