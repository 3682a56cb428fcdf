//! Document store.
//!
//! The ordered list of top-level blocks for one lesson, and the positional
//! operations authors perform on it. Operations addressed by id tolerate
//! stale ids: a missing block is a no-op, never an error, because authoring
//! views routinely hold references to blocks that were just removed.

use std::collections::HashSet;

use lectern_sdk::types::{Block, BlockData, BlockId, BlockKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::block_types::BlockKindRegistry;
use super::factory;
use super::split;
use crate::error::{EditorError, EditorResult};

/// Direction for [`Document::move_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// An ordered lesson document. Serializes as a plain array of block records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from existing blocks, enforcing id uniqueness.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self::new();
        doc.replace_all(blocks);
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|b| b.id.clone()).collect()
    }

    pub fn kinds(&self) -> Vec<BlockKind> {
        self.blocks.iter().map(Block::kind).collect()
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }

    /// Sanitize the rich-text content of every block and populated slot.
    pub fn sanitize(&mut self, registry: &BlockKindRegistry) {
        registry.sanitize_blocks(&mut self.blocks);
    }

    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    /// Insert a blank block of `kind` at `at` (end of document when `None`
    /// or past the end). Returns the new id so the caller can focus it.
    pub fn insert(&mut self, kind: BlockKind, at: Option<usize>) -> BlockId {
        self.insert_block(factory::new_block(kind), at)
    }

    /// Insert an already-built block. A colliding id is replaced by a fresh one.
    pub fn insert_block(&mut self, mut block: Block, at: Option<usize>) -> BlockId {
        if self.get(&block.id).is_some() {
            warn!(id = %block.id, "inserted block id already present, assigning a fresh id");
            block.id = BlockId::generate();
        }
        let index = at.unwrap_or(self.blocks.len()).min(self.blocks.len());
        let id = block.id.clone();
        debug!(%id, kind = %block.kind(), index, "insert block");
        self.blocks.insert(index, block);
        id
    }

    /// Remove the block with `id`, returning it. Missing ids are ignored.
    pub fn remove(&mut self, id: &BlockId) -> Option<Block> {
        let Some(index) = self.position(id) else {
            debug!(%id, "remove: ignoring stale block id");
            return None;
        };
        debug!(%id, index, "remove block");
        Some(self.blocks.remove(index))
    }

    /// Swap the block at `index` with its neighbour. Moving the first block
    /// up, the last block down, or an out-of-range index changes nothing.
    /// Returns whether a swap happened.
    pub fn move_block(&mut self, index: usize, direction: Direction) -> bool {
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };
        let Some(target) = target.filter(|&t| t < self.blocks.len() && index < self.blocks.len())
        else {
            debug!(index, ?direction, "move: at boundary, nothing to do");
            return false;
        };
        self.blocks.swap(index, target);
        true
    }

    /// Replace a block's rich-text content.
    pub fn update_content(&mut self, id: &BlockId, html: impl Into<String>) {
        match self.get_mut(id) {
            Some(block) => block.content = Some(html.into()),
            None => debug!(%id, "update_content: ignoring stale block id"),
        }
    }

    /// Shallow-merge `patch` (a JSON object) into the block's payload.
    ///
    /// Keys absent from the patch keep their current value. The merged object
    /// must still read as the block's own payload type; otherwise the block is
    /// left unchanged and `InvalidPatch` is returned. A merged split payload
    /// must keep both slots to the slot kinds (`KindNotAllowedInSlot`).
    pub fn update_data(&mut self, id: &BlockId, patch: Value) -> EditorResult<()> {
        let Some(block) = self.get_mut(id) else {
            debug!(%id, "update_data: ignoring stale block id");
            return Ok(());
        };
        let kind = block.kind();
        let merged = merge_patch(block.data.to_value(), patch).map_err(|details| {
            EditorError::InvalidPatch {
                id: id.clone(),
                kind,
                details,
            }
        })?;
        let data = BlockData::from_value(kind, merged).map_err(|e| EditorError::InvalidPatch {
            id: id.clone(),
            kind,
            details: e.to_string(),
        })?;
        if let BlockData::Split(slots) = &data {
            split::check_slots(slots)?;
        }
        block.data = data;
        Ok(())
    }

    /// Replace a block's payload wholesale. The kind may change; a split
    /// payload is held to the slot kinds like [`Document::update_data`].
    pub fn set_data(&mut self, id: &BlockId, data: impl Into<BlockData>) -> EditorResult<()> {
        let data = data.into();
        if let BlockData::Split(slots) = &data {
            split::check_slots(slots)?;
        }
        match self.get_mut(id) {
            Some(block) => block.data = data,
            None => debug!(%id, "set_data: ignoring stale block id"),
        }
        Ok(())
    }

    /// Insert a deep copy of a block, with a fresh id, right after it.
    pub fn duplicate(&mut self, id: &BlockId) -> Option<BlockId> {
        let index = self.position(id)?;
        let mut copy = self.blocks[index].clone();
        copy.id = BlockId::generate();
        Some(self.insert_block(copy, Some(index + 1)))
    }

    /// Replace the whole document (template instantiation, document load).
    /// Later blocks that repeat an earlier id get a fresh one.
    pub fn replace_all(&mut self, blocks: Vec<Block>) {
        let mut seen = HashSet::new();
        self.blocks = blocks
            .into_iter()
            .map(|mut block| {
                if !seen.insert(block.id.clone()) {
                    warn!(id = %block.id, "duplicate block id on load, assigning a fresh id");
                    block.id = BlockId::generate();
                    seen.insert(block.id.clone());
                }
                block
            })
            .collect();
        debug!(blocks = self.blocks.len(), "document replaced");
    }

    /// Serialize for the persistence collaborator.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(&self.blocks)?)
    }

    /// Load a document from its persisted JSON array.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let blocks: Vec<Block> = serde_json::from_str(json)?;
        Ok(Self::from_blocks(blocks))
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Shallow-merge a JSON object patch over the current payload value.
pub(crate) fn merge_patch(current: Option<Value>, patch: Value) -> Result<Option<Value>, String> {
    let Value::Object(patch) = patch else {
        return Err("patch must be a JSON object".to_string());
    };
    let mut merged = match current {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    merged.extend(patch);
    Ok(Some(Value::Object(merged)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use lectern_sdk::types::{LeafData, QuizData, TableData};
    use serde_json::json;

    fn table(doc: &Document, id: &BlockId) -> TableData {
        match doc.get(id).and_then(Block::as_leaf) {
            Some(LeafData::Table(t)) => t.clone(),
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn insert_defaults_to_end() {
        let mut doc = Document::new();
        let a = doc.insert(BlockKind::Text, None);
        let b = doc.insert(BlockKind::Divider, None);
        assert_eq!(doc.ids(), vec![a, b]);
    }

    #[test]
    fn insert_past_end_appends() {
        let mut doc = Document::new();
        doc.insert(BlockKind::Text, None);
        let b = doc.insert(BlockKind::Quote, Some(99));
        assert_eq!(doc.position(&b), Some(1));
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let mut doc = Document::new();
        doc.insert(BlockKind::Text, None);
        let before = doc.clone();
        assert!(doc.remove(&BlockId::from("gone")).is_none());
        assert_eq!(doc, before);
    }

    #[test]
    fn move_at_boundaries_changes_nothing() {
        let mut doc = Document::new();
        doc.insert(BlockKind::Text, None);
        doc.insert(BlockKind::Quiz, None);
        let before = doc.clone();
        assert!(!doc.move_block(0, Direction::Up));
        assert!(!doc.move_block(1, Direction::Down));
        assert!(!doc.move_block(7, Direction::Up));
        assert_eq!(doc, before);
    }

    #[test]
    fn move_swaps_neighbours() {
        let mut doc = Document::new();
        let a = doc.insert(BlockKind::Text, None);
        let b = doc.insert(BlockKind::Quiz, None);
        assert!(doc.move_block(0, Direction::Down));
        assert_eq!(doc.ids(), vec![b, a]);
    }

    #[test]
    fn update_data_merges_shallowly() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Table, None);
        let headers_before = table(&doc, &id).headers;

        doc.update_data(&id, json!({ "rows": [["x", "y"]] })).unwrap();

        let t = table(&doc, &id);
        assert_eq!(t.headers, headers_before);
        assert_eq!(t.rows, vec![vec!["x".to_string(), "y".to_string()]]);
    }

    #[test]
    fn update_data_keeps_unpatched_quiz_fields() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Quiz, None);
        doc.update_data(
            &id,
            json!({ "questions": [{ "id": "q", "question": "?", "options": ["a"], "correctAnswer": 0 }] }),
        )
        .unwrap();
        doc.update_data(&id, json!({ "title": "Renamed" })).unwrap();

        let Some(LeafData::Quiz(QuizData { title, questions })) =
            doc.get(&id).and_then(Block::as_leaf)
        else {
            panic!("expected quiz");
        };
        assert_eq!(title, "Renamed");
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn update_data_rejects_shape_mismatch_and_keeps_block() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Table, None);
        let before = doc.clone();
        let err = doc.update_data(&id, json!({ "rows": "not a grid" })).unwrap_err();
        assert!(matches!(err, EditorError::InvalidPatch { kind: BlockKind::Table, .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn update_data_rejects_non_object_patch() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Table, None);
        assert!(doc.update_data(&id, json!([1, 2])).is_err());
    }

    #[test]
    fn update_data_on_missing_id_is_noop() {
        let mut doc = Document::new();
        assert!(doc.update_data(&BlockId::from("nope"), json!({ "a": 1 })).is_ok());
        assert!(doc.is_empty());
    }

    #[test]
    fn update_content_is_stored_for_any_kind() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Divider, None);
        doc.update_content(&id, "<p>ignored</p>");
        assert_eq!(doc.get(&id).unwrap().content.as_deref(), Some("<p>ignored</p>"));
    }

    #[test]
    fn duplicate_inserts_independent_copy_after_source() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Table, None);
        doc.insert(BlockKind::Divider, None);
        let copy = doc.duplicate(&id).unwrap();
        assert_ne!(copy, id);
        assert_eq!(doc.position(&copy), Some(1));

        doc.update_data(&copy, json!({ "headers": ["Only"] })).unwrap();
        assert_eq!(table(&doc, &id).headers.len(), 2);
    }

    #[test]
    fn replace_all_reassigns_duplicate_ids() {
        let mut doc = Document::new();
        let a = factory::new_block(BlockKind::Text);
        let mut b = factory::new_block(BlockKind::Divider);
        b.id = a.id.clone();
        doc.replace_all(vec![a.clone(), b]);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.blocks()[0].id, a.id);
        assert_ne!(doc.blocks()[1].id, a.id);
    }

    #[test]
    fn json_round_trip_preserves_order_and_payloads() {
        let mut doc = Document::new();
        let text = doc.insert(BlockKind::Text, None);
        doc.update_content(&text, "<p>Hi</p>");
        doc.insert(BlockKind::Split, None);
        doc.insert(BlockKind::Steps, None);

        let json = doc.to_json().unwrap();
        let loaded = Document::from_json(&json).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn serializes_as_array_of_records() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Divider, None);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!([{ "id": id.as_str(), "kind": "divider" }]));
    }
}
