//! Renderer integration tests: parity between the read-only and editable
//! trees, and HTML output.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeSet;

use lectern_kernel::content::split::{self, Slot};
use lectern_kernel::content::{
    BlockKindRegistry, ContentTarget, Document, RichTextCommand, RichTextSurface,
};
use lectern_kernel::render::{EditableRenderer, PreviewRenderer, same_structure, to_html};
use lectern_kernel::session::EditorSession;
use lectern_sdk::render::{CONTROL, RenderElement};
use lectern_sdk::types::BlockKind;
use lectern_test_utils::{MemorySurface, every_kind_document, filled_block};

fn rendered_kinds(tree: &RenderElement) -> BTreeSet<String> {
    let mut kinds = BTreeSet::new();
    tree.walk(&mut |el| {
        if el.has_class("block")
            && let Some(kind) = el.attr("data-kind")
        {
            kinds.insert(kind.to_string());
        }
    });
    kinds
}

#[test]
fn both_renderers_handle_every_kind() {
    let doc = every_kind_document();
    let session = EditorSession::new();
    let registry = BlockKindRegistry::with_standard_kinds();

    let preview = PreviewRenderer::default().render(&doc);
    let editable = EditableRenderer::new(&session, &registry).render(&doc);

    let all: BTreeSet<_> = BlockKind::ALL.iter().map(|k| k.as_str().to_string()).collect();
    assert_eq!(rendered_kinds(&preview), all);
    assert_eq!(rendered_kinds(&editable), all);
    assert!(same_structure(&preview, &editable));
}

#[test]
fn parity_holds_for_default_blocks() {
    let mut doc = Document::new();
    for kind in BlockKind::ALL {
        doc.insert(kind, None);
    }
    let session = EditorSession::new();
    let registry = BlockKindRegistry::with_standard_kinds();
    let preview = PreviewRenderer::default().render(&doc);
    let editable = EditableRenderer::new(&session, &registry).render(&doc);
    assert!(same_structure(&preview, &editable));
}

#[test]
fn parity_holds_with_open_editors_and_pickers() {
    let mut doc = every_kind_document();
    let split_id = doc
        .iter()
        .find(|b| b.kind() == BlockKind::Split)
        .map(|b| b.id.clone())
        .unwrap();
    let table_id = doc
        .iter()
        .find(|b| b.kind() == BlockKind::Table)
        .map(|b| b.id.clone())
        .unwrap();
    split::populate_slot(&mut doc, &split_id, Slot::Left, BlockKind::Quiz).unwrap();

    let mut session = EditorSession::new();
    session.focus(table_id.clone());
    session.open_editor(ContentTarget::Block { id: table_id }, BlockKind::Table);
    session.open_slot_picker(split_id, Slot::Right);

    let registry = BlockKindRegistry::with_standard_kinds();
    let surface = MemorySurface::new();
    let editable = EditableRenderer::new(&session, &registry)
        .with_surface(&surface)
        .render(&doc);
    let preview = PreviewRenderer::default().render(&doc);
    assert!(same_structure(&preview, &editable));
}

/// Values of elements carrying `class`, and of options flagged correct.
fn quiz_markers(tree: &RenderElement) -> (Vec<String>, Vec<String>) {
    let (mut explanations, mut correct) = (Vec::new(), Vec::new());
    tree.walk(&mut |el| {
        let value = el.value.clone().unwrap_or_default();
        if el.has_class("quiz__explanation") {
            explanations.push(value.clone());
        }
        if el.attr("data-correct") == Some("true") {
            correct.push(value);
        }
    });
    (explanations, correct)
}

#[test]
fn quiz_markup_agrees_between_renderers() {
    let mut doc = Document::new();
    doc.insert_block(filled_block(BlockKind::Quiz), None);
    let session = EditorSession::new();
    let registry = BlockKindRegistry::with_standard_kinds();

    let preview = PreviewRenderer::default().render(&doc);
    let editable = EditableRenderer::new(&session, &registry).render(&doc);

    assert_eq!(preview.skeleton(), editable.skeleton());
    let expected = (vec!["Basic arithmetic".to_string()], vec!["4".to_string()]);
    assert_eq!(quiz_markers(&preview), expected);
    assert_eq!(quiz_markers(&editable), expected);
}

#[test]
fn parity_notices_a_dropped_display_class() {
    let mut doc = Document::new();
    doc.insert_block(filled_block(BlockKind::Callout), None);
    let preview = PreviewRenderer::default().render(&doc);

    let mut altered = preview.clone();
    let callout = altered
        .children
        .get_mut("item_0000")
        .and_then(|block| block.children.get_mut("body"))
        .unwrap();
    callout.attributes = None;
    assert!(!same_structure(&preview, &altered));
}

#[test]
fn only_the_editable_tree_has_controls() {
    let doc = every_kind_document();
    let session = EditorSession::new();
    let registry = BlockKindRegistry::with_standard_kinds();
    assert!(!PreviewRenderer::default().render(&doc).contains_type(CONTROL));
    assert!(EditableRenderer::new(&session, &registry).render(&doc).contains_type(CONTROL));
}

#[test]
fn focused_prose_block_gets_toolbar_with_active_marks() {
    let mut doc = Document::new();
    let id = doc.insert(BlockKind::Text, None);
    let mut session = EditorSession::new();
    session.focus(id);

    let mut surface = MemorySurface::new();
    surface.exec(RichTextCommand::Bold, None);

    let registry = BlockKindRegistry::with_standard_kinds();
    let tree = EditableRenderer::new(&session, &registry)
        .with_surface(&surface)
        .render(&doc);
    let block = &tree.children["item_0000"];
    assert!(block.has_class("is-focused"));
    let toolbar = &block.children["toolbar"];
    let mut active = Vec::new();
    toolbar.walk(&mut |el| {
        if el.has_class("is-active") {
            active.push(el.attr("data-command").unwrap_or_default().to_string());
        }
    });
    assert_eq!(active, vec!["bold".to_string()]);
}

#[test]
fn preview_html_is_sanitized() {
    let mut doc = Document::new();
    let id = doc.insert(BlockKind::Text, None);
    doc.update_content(&id, "<p onclick=\"steal()\">Hi<script>alert(1)</script></p>");
    let html = to_html(&PreviewRenderer::default().render(&doc));
    assert!(html.contains("<p>Hi</p>"));
    assert!(!html.contains("script"));
    assert!(!html.contains("onclick"));
    assert!(html.starts_with("<article class=\"lesson\">"));
}

#[test]
fn editable_html_marks_prose_editable() {
    let mut doc = Document::new();
    doc.insert(BlockKind::Text, None);
    let session = EditorSession::new();
    let registry = BlockKindRegistry::with_standard_kinds();
    let html = to_html(&EditableRenderer::new(&session, &registry).render(&doc));
    assert!(html.contains("contenteditable=\"true\""));
    assert!(html.contains("data-action=\"remove\""));
}
