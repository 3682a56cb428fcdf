//! Editor session state.
//!
//! Which block has focus, which sub-editor is open and which split slot is
//! showing its kind picker. A plain value passed to the editable renderer;
//! nothing here is global.

use lectern_sdk::types::{BlockId, BlockKind};
use serde::{Deserialize, Serialize};

use crate::content::rich_text::ContentTarget;
use crate::content::split::Slot;

/// A sub-editor open on one block or slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenEditor {
    pub target: ContentTarget,
    pub kind: BlockKind,
}

/// A split slot whose "add content" picker is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPicker {
    pub id: BlockId,
    pub slot: Slot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused: Option<BlockId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_editor: Option<OpenEditor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_picker: Option<SlotPicker>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&mut self, id: BlockId) {
        self.focused = Some(id);
    }

    pub fn is_focused(&self, id: &BlockId) -> bool {
        self.focused.as_ref() == Some(id)
    }

    /// Open a sub-editor. Only one is open at a time.
    pub fn open_editor(&mut self, target: ContentTarget, kind: BlockKind) {
        self.slot_picker = None;
        self.open_editor = Some(OpenEditor { target, kind });
    }

    pub fn close_editor(&mut self) {
        self.open_editor = None;
    }

    /// The editor open on block `id` itself (not on one of its slots).
    pub fn editor_for(&self, id: &BlockId) -> Option<&OpenEditor> {
        self.open_editor
            .as_ref()
            .filter(|e| matches!(&e.target, ContentTarget::Block { id: target } if target == id))
    }

    /// The editor open on a slot of block `id`.
    pub fn editor_for_slot(&self, id: &BlockId, slot: Slot) -> Option<&OpenEditor> {
        self.open_editor.as_ref().filter(|e| {
            matches!(&e.target, ContentTarget::Slot { id: target, slot: s } if target == id && *s == slot)
        })
    }

    pub fn open_slot_picker(&mut self, id: BlockId, slot: Slot) {
        self.slot_picker = Some(SlotPicker { id, slot });
    }

    pub fn close_slot_picker(&mut self) {
        self.slot_picker = None;
    }

    pub fn is_picking(&self, id: &BlockId, slot: Slot) -> bool {
        self.slot_picker
            .as_ref()
            .is_some_and(|p| &p.id == id && p.slot == slot)
    }

    /// Drop every reference to a removed block.
    pub fn forget(&mut self, id: &BlockId) {
        if self.focused.as_ref() == Some(id) {
            self.focused = None;
        }
        if self
            .open_editor
            .as_ref()
            .is_some_and(|e| e.target.block_id() == id)
        {
            self.open_editor = None;
        }
        if self.slot_picker.as_ref().is_some_and(|p| &p.id == id) {
            self.slot_picker = None;
        }
    }
}
