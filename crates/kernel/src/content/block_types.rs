//! Block kind registry and per-kind shape validation.
//!
//! Provides:
//! - `BlockKindDefinition`: label and placement metadata for a single kind
//! - `BlockKindRegistry`: every known kind, with shape validation
//! - `sanitize_html`: HTML sanitization via ammonia
//! - `sanitize_blocks`: in-place sanitization of prose content across a document
//!
//! Validation reports problems; it never repairs them. Repairing is the job
//! of the sub-editors, which must not produce malformed data in the first
//! place.

use std::collections::{HashMap, HashSet};

use lectern_sdk::types::{Block, BlockData, BlockKind, LeafData, SubBlock};
use serde::{Deserialize, Serialize};

use super::split::SLOT_KINDS;

/// Definition of a single block kind in the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockKindDefinition {
    pub kind: BlockKind,
    /// Human-readable label shown on the toolbar (e.g. "Flashcards").
    pub label: String,
    /// Whether the kind's primary payload is rich-text `content`.
    pub prose: bool,
    /// Whether the kind may be placed in a split slot.
    pub slot_allowed: bool,
}

/// Registry of block kind definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockKindRegistry {
    kinds: HashMap<BlockKind, BlockKindDefinition>,
}

impl Default for BlockKindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockKindRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with all 16 standard kinds.
    pub fn with_standard_kinds() -> Self {
        let mut registry = Self::new();
        for kind in BlockKind::ALL {
            registry.register(BlockKindDefinition {
                kind,
                label: standard_label(kind).to_string(),
                prose: kind.is_prose(),
                slot_allowed: SLOT_KINDS.contains(&kind),
            });
        }
        registry
    }

    pub fn register(&mut self, definition: BlockKindDefinition) {
        self.kinds.insert(definition.kind, definition);
    }

    pub fn get(&self, kind: BlockKind) -> Option<&BlockKindDefinition> {
        self.kinds.get(&kind)
    }

    pub fn contains(&self, kind: BlockKind) -> bool {
        self.kinds.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Registered definitions in toolbar order.
    pub fn toolbar(&self) -> Vec<&BlockKindDefinition> {
        BlockKind::ALL
            .iter()
            .filter_map(|k| self.kinds.get(k))
            .collect()
    }

    /// Validate one block's payload against its kind's shape.
    ///
    /// Returns a list of validation error messages. An empty list means the
    /// block is valid.
    pub fn validate_block(&self, block: &Block) -> Vec<String> {
        let mut errors = Vec::new();
        let kind = block.kind();

        if !self.contains(kind) {
            errors.push(format!("unknown block kind '{kind}'"));
            return errors;
        }

        match &block.data {
            BlockData::Leaf(leaf) => {
                validate_leaf(kind.as_str(), leaf, block.content.as_deref(), &mut errors);
            }
            BlockData::Split(split) => {
                for (slot, sub) in [("left", &split.left), ("right", &split.right)] {
                    if let Some(sub) = sub {
                        self.validate_slot(slot, sub, &mut errors);
                    }
                }
            }
        }

        errors
    }

    fn validate_slot(&self, slot: &str, sub: &SubBlock, errors: &mut Vec<String>) {
        let kind = sub.kind();
        let allowed = self.get(kind).is_some_and(|d| d.slot_allowed);
        if !allowed {
            errors.push(format!(
                "split: {slot} slot holds '{kind}', which is not allowed in a slot"
            ));
        }
        let prefix = format!("split.{slot}.{kind}");
        validate_leaf(&prefix, &sub.data, sub.content.as_deref(), errors);
    }

    /// Validate every block plus document-wide invariants (unique ids).
    pub fn validate_document(&self, blocks: &[Block]) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for (pos, block) in blocks.iter().enumerate() {
            if let Some(first) = seen.insert(block.id.as_str(), pos) {
                errors.push(format!(
                    "duplicate block id '{}' at positions {first} and {pos}",
                    block.id
                ));
            }
            errors.extend(
                self.validate_block(block)
                    .into_iter()
                    .map(|e| format!("block {pos}: {e}")),
            );
        }

        errors
    }

    /// Sanitize the prose `content` of every block (and slot) in-place.
    pub fn sanitize_blocks(&self, blocks: &mut [Block]) {
        for block in blocks.iter_mut() {
            if block.kind().is_prose() {
                sanitize_content(&mut block.content);
            }
            if let Some(split) = block.as_split_mut() {
                for sub in [&mut split.left, &mut split.right].into_iter().flatten() {
                    if sub.kind().is_prose() {
                        sanitize_content(&mut sub.content);
                    }
                }
            }
        }
    }
}

fn standard_label(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Text => "Text",
        BlockKind::Image => "Image",
        BlockKind::Video => "Video",
        BlockKind::Quiz => "Quiz",
        BlockKind::FlashcardDeck => "Flashcards",
        BlockKind::Callout => "Callout",
        BlockKind::Split => "Two columns",
        BlockKind::Quote => "Quote",
        BlockKind::Divider => "Divider",
        BlockKind::Table => "Table",
        BlockKind::List => "List",
        BlockKind::Audio => "Audio",
        BlockKind::Accordion => "Accordion",
        BlockKind::Steps => "Steps",
        BlockKind::File => "File",
        BlockKind::Code => "Code",
    }
}

/// Validate a leaf payload. `prefix` names the block in messages.
fn validate_leaf(prefix: &str, leaf: &LeafData, content: Option<&str>, errors: &mut Vec<String>) {
    if leaf.kind().is_prose() {
        validate_prose(prefix, content, errors);
    }

    match leaf {
        LeafData::Table(table) => {
            let width = table.headers.len();
            for (i, row) in table.rows.iter().enumerate() {
                if row.len() != width {
                    errors.push(format!(
                        "{prefix}: row {i} has {} cells, expected {width}",
                        row.len()
                    ));
                }
            }
        }
        LeafData::Quiz(quiz) => {
            for (i, q) in quiz.questions.iter().enumerate() {
                if q.options.is_empty() {
                    errors.push(format!("{prefix}: question {i} has no options"));
                } else if q.correct_answer >= q.options.len() {
                    errors.push(format!(
                        "{prefix}: question {i} correctAnswer {} is out of range for {} options",
                        q.correct_answer,
                        q.options.len()
                    ));
                }
            }
            check_unique_ids(prefix, "question", quiz.questions.iter().map(|q| q.id.as_str()), errors);
        }
        LeafData::FlashcardDeck(deck) => {
            check_unique_ids(prefix, "card", deck.cards.iter().map(|c| c.id.as_str()), errors);
        }
        LeafData::Image(image) => {
            if image.items.is_empty() {
                errors.push(format!("{prefix}: at least one image item is required"));
            }
            if image.columns == 0 {
                errors.push(format!("{prefix}: columns must be at least 1"));
            }
        }
        // Remaining kinds have no structural invariants beyond their types.
        _ => {}
    }
}

fn check_unique_ids<'a>(
    prefix: &str,
    what: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for id in ids.filter(|id| !id.is_empty()) {
        if !seen.insert(id) {
            errors.push(format!("{prefix}: duplicate {what} id '{id}'"));
        }
    }
}

/// Flag prose that would be altered by sanitization.
fn validate_prose(prefix: &str, content: Option<&str>, errors: &mut Vec<String>) {
    if let Some(html) = content
        && sanitize_html(html) != html
    {
        errors.push(format!(
            "{prefix}: content contains disallowed HTML that was sanitized"
        ));
    }
}

fn sanitize_content(content: &mut Option<String>) {
    if let Some(html) = content.as_mut() {
        *html = sanitize_html(html);
    }
}

/// Sanitize HTML input using ammonia with default settings.
///
/// Strips dangerous elements like `<script>`, event handlers, and
/// other XSS vectors while preserving safe formatting tags.
pub fn sanitize_html(input: &str) -> String {
    ammonia::clean(input)
}
