//! Split-block controller.
//!
//! A split block holds a left and a right slot, each empty or holding one
//! sub-block. Slots accept only a subset of kinds, never `split` itself.

use lectern_sdk::types::{BlockId, BlockKind, LeafData, SplitData, SubBlock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::document::{Document, merge_patch};
use super::factory;
use crate::error::{EditorError, EditorResult};

/// Kinds an author may place in a split slot.
pub const SLOT_KINDS: [BlockKind; 8] = [
    BlockKind::Text,
    BlockKind::Image,
    BlockKind::Video,
    BlockKind::Callout,
    BlockKind::Quiz,
    BlockKind::FlashcardDeck,
    BlockKind::Table,
    BlockKind::List,
];

/// One side of a split block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Left,
    Right,
}

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::Left, Slot::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Left => "left",
            Slot::Right => "right",
        }
    }

    pub fn get(self, split: &SplitData) -> Option<&SubBlock> {
        match self {
            Slot::Left => split.left.as_ref(),
            Slot::Right => split.right.as_ref(),
        }
    }

    pub fn get_mut(self, split: &mut SplitData) -> &mut Option<SubBlock> {
        match self {
            Slot::Left => &mut split.left,
            Slot::Right => &mut split.right,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kinds offered by an empty slot's "add content" picker.
pub fn available_kinds() -> &'static [BlockKind] {
    &SLOT_KINDS
}

pub fn is_slot_kind(kind: BlockKind) -> bool {
    SLOT_KINDS.contains(&kind)
}

/// `KindNotAllowedInSlot` for the first slot holding a kind outside
/// [`SLOT_KINDS`].
pub fn check_slots(split: &SplitData) -> EditorResult<()> {
    match Slot::BOTH
        .into_iter()
        .filter_map(|slot| slot.get(split))
        .map(|sub| sub.kind())
        .find(|kind| !is_slot_kind(*kind))
    {
        Some(kind) => Err(EditorError::KindNotAllowedInSlot { kind }),
        None => Ok(()),
    }
}

/// Look up the split payload of block `id`.
///
/// `Ok(None)` for a stale id, `NotASplit` for a block of another kind.
fn split_mut<'a>(doc: &'a mut Document, id: &BlockId) -> EditorResult<Option<&'a mut SplitData>> {
    let Some(block) = doc.get_mut(id) else {
        debug!(%id, "split: ignoring stale block id");
        return Ok(None);
    };
    block
        .as_split_mut()
        .map(Some)
        .ok_or_else(|| EditorError::NotASplit(id.clone()))
}

/// Read access to one slot of a split block.
pub fn slot<'a>(doc: &'a Document, id: &BlockId, slot: Slot) -> Option<&'a SubBlock> {
    doc.get(id)?.as_split().and_then(|split| slot.get(split))
}

/// Fill `slot` with a blank sub-block of `kind`, replacing any current one.
pub fn populate_slot(
    doc: &mut Document,
    id: &BlockId,
    slot: Slot,
    kind: BlockKind,
) -> EditorResult<()> {
    if !is_slot_kind(kind) {
        return Err(EditorError::KindNotAllowedInSlot { kind });
    }
    let Some(split) = split_mut(doc, id)? else {
        return Ok(());
    };
    debug!(%id, %slot, %kind, "populate slot");
    *slot.get_mut(split) = Some(factory::new_sub_block(kind)?);
    Ok(())
}

/// Replace the rich-text content of a populated slot. Empty slots are left alone.
pub fn update_slot_content(
    doc: &mut Document,
    id: &BlockId,
    slot: Slot,
    html: impl Into<String>,
) -> EditorResult<()> {
    let Some(split) = split_mut(doc, id)? else {
        return Ok(());
    };
    match slot.get_mut(split) {
        Some(sub) => sub.content = Some(html.into()),
        None => debug!(%id, %slot, "update_slot_content: slot is empty"),
    }
    Ok(())
}

/// Shallow-merge `patch` into a populated slot's payload, with the same
/// rules as [`Document::update_data`].
pub fn update_slot_data(
    doc: &mut Document,
    id: &BlockId,
    slot: Slot,
    patch: Value,
) -> EditorResult<()> {
    let Some(split) = split_mut(doc, id)? else {
        return Ok(());
    };
    let Some(sub) = slot.get_mut(split) else {
        debug!(%id, %slot, "update_slot_data: slot is empty");
        return Ok(());
    };
    let kind = sub.kind();
    let invalid = |details: String| EditorError::InvalidPatch {
        id: id.clone(),
        kind,
        details: format!("{slot} slot: {details}"),
    };
    let merged = merge_patch(sub.data.to_value(), patch).map_err(invalid)?;
    sub.data = LeafData::from_value(kind, merged).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

/// Replace a populated slot's payload wholesale. The slot keeps its kind
/// unless `data` is of another slot kind.
pub fn set_slot_data(
    doc: &mut Document,
    id: &BlockId,
    slot: Slot,
    data: LeafData,
) -> EditorResult<()> {
    let kind = data.kind();
    if !is_slot_kind(kind) {
        return Err(EditorError::KindNotAllowedInSlot { kind });
    }
    let Some(split) = split_mut(doc, id)? else {
        return Ok(());
    };
    match slot.get_mut(split) {
        Some(sub) => sub.data = data,
        None => debug!(%id, %slot, "set_slot_data: slot is empty"),
    }
    Ok(())
}

/// Empty `slot`. The sibling slot is untouched.
pub fn clear_slot(doc: &mut Document, id: &BlockId, slot: Slot) -> EditorResult<()> {
    let Some(split) = split_mut(doc, id)? else {
        return Ok(());
    };
    debug!(%id, %slot, "clear slot");
    *slot.get_mut(split) = None;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use lectern_sdk::types::TableData;
    use serde_json::json;

    fn doc_with_split() -> (Document, BlockId) {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Split, None);
        (doc, id)
    }

    #[test]
    fn slots_start_empty() {
        let (doc, id) = doc_with_split();
        assert!(slot(&doc, &id, Slot::Left).is_none());
        assert!(slot(&doc, &id, Slot::Right).is_none());
    }

    #[test]
    fn available_kinds_exclude_split() {
        assert!(!available_kinds().contains(&BlockKind::Split));
        assert!(!available_kinds().contains(&BlockKind::Code));
        assert_eq!(available_kinds().len(), 8);
    }

    #[test]
    fn populate_uses_factory_default() {
        let (mut doc, id) = doc_with_split();
        populate_slot(&mut doc, &id, Slot::Left, BlockKind::Table).unwrap();
        let sub = slot(&doc, &id, Slot::Left).unwrap();
        assert_eq!(sub.data, factory::default_leaf(BlockKind::Table).unwrap());
    }

    #[test]
    fn populate_rejects_split_and_non_slot_kinds() {
        let (mut doc, id) = doc_with_split();
        for kind in [BlockKind::Split, BlockKind::Steps, BlockKind::Code] {
            assert!(matches!(
                populate_slot(&mut doc, &id, Slot::Right, kind),
                Err(EditorError::KindNotAllowedInSlot { kind: k }) if k == kind
            ));
        }
        assert!(slot(&doc, &id, Slot::Right).is_none());
    }

    #[test]
    fn addressing_non_split_block_is_an_error() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Text, None);
        assert!(matches!(
            populate_slot(&mut doc, &id, Slot::Left, BlockKind::Text),
            Err(EditorError::NotASplit(_))
        ));
    }

    #[test]
    fn missing_block_is_noop() {
        let mut doc = Document::new();
        let ghost = BlockId::from("ghost");
        assert!(populate_slot(&mut doc, &ghost, Slot::Left, BlockKind::Text).is_ok());
        assert!(clear_slot(&mut doc, &ghost, Slot::Left).is_ok());
    }

    #[test]
    fn clear_leaves_sibling_alone() {
        let (mut doc, id) = doc_with_split();
        populate_slot(&mut doc, &id, Slot::Left, BlockKind::Text).unwrap();
        populate_slot(&mut doc, &id, Slot::Right, BlockKind::Quiz).unwrap();
        clear_slot(&mut doc, &id, Slot::Left).unwrap();
        assert!(slot(&doc, &id, Slot::Left).is_none());
        assert_eq!(slot(&doc, &id, Slot::Right).unwrap().kind(), BlockKind::Quiz);
    }

    #[test]
    fn slot_content_and_data_updates() {
        let (mut doc, id) = doc_with_split();
        populate_slot(&mut doc, &id, Slot::Left, BlockKind::Text).unwrap();
        populate_slot(&mut doc, &id, Slot::Right, BlockKind::Table).unwrap();

        update_slot_content(&mut doc, &id, Slot::Left, "<p>Left</p>").unwrap();
        update_slot_data(&mut doc, &id, Slot::Right, json!({ "headers": ["A", "B"] })).unwrap();

        let left = slot(&doc, &id, Slot::Left).unwrap();
        assert_eq!(left.content.as_deref(), Some("<p>Left</p>"));
        let LeafData::Table(TableData { headers, rows }) = &slot(&doc, &id, Slot::Right).unwrap().data
        else {
            panic!("expected table");
        };
        assert_eq!(headers, &vec!["A".to_string(), "B".to_string()]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn bad_slot_patch_is_rejected() {
        let (mut doc, id) = doc_with_split();
        populate_slot(&mut doc, &id, Slot::Left, BlockKind::List).unwrap();
        let before = doc.clone();
        assert!(update_slot_data(&mut doc, &id, Slot::Left, json!({ "items": 3 })).is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn updating_empty_slot_changes_nothing() {
        let (mut doc, id) = doc_with_split();
        let before = doc.clone();
        update_slot_content(&mut doc, &id, Slot::Left, "<p>x</p>").unwrap();
        update_slot_data(&mut doc, &id, Slot::Left, json!({ "a": 1 })).unwrap();
        assert_eq!(doc, before);
    }
}
