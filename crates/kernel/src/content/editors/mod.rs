//! Sub-editors.
//!
//! Each sub-editor owns the mutation rules for one kind's payload. It works
//! on a private copy of the data and only commits through an
//! [`EditorHost`], which writes into the document with the store's merge
//! semantics. The same editor serves a top-level block ([`BlockHost`]) and a
//! split slot ([`SlotHost`]).

mod flashcard;
mod list;
mod quiz;
mod steps;
mod table;

pub use flashcard::FlashcardEditor;
pub use list::ListEditor;
pub use quiz::QuizEditor;
pub use steps::StepsEditor;
pub use table::TableEditor;

use lectern_sdk::types::{
    AccordionData, AudioData, BlockId, BlockKind, CalloutData, CodeData, FileData,
    FlashcardDeckData, ImageData, LeafData, ListData, QuizData, QuoteData, StepsData, TableData,
    VideoData,
};
use serde::Serialize;
use tracing::debug;

use super::document::Document;
use super::split::{self, Slot};
use crate::error::{EditorError, EditorResult};

/// A typed per-kind payload.
pub trait Payload: Clone + Serialize {
    const KIND: BlockKind;

    /// Borrow the payload out of a leaf of the matching kind.
    fn from_leaf(leaf: &LeafData) -> Option<&Self>;

    fn into_leaf(self) -> LeafData;
}

macro_rules! impl_payload {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Payload for $ty {
                const KIND: BlockKind = BlockKind::$variant;

                fn from_leaf(leaf: &LeafData) -> Option<&Self> {
                    match leaf {
                        LeafData::$variant(data) => Some(data),
                        _ => None,
                    }
                }

                fn into_leaf(self) -> LeafData {
                    LeafData::$variant(self)
                }
            }
        )*
    };
}

impl_payload! {
    ImageData => Image,
    VideoData => Video,
    AudioData => Audio,
    FileData => File,
    QuizData => Quiz,
    FlashcardDeckData => FlashcardDeck,
    CalloutData => Callout,
    QuoteData => Quote,
    TableData => Table,
    ListData => List,
    AccordionData => Accordion,
    StepsData => Steps,
    CodeData => Code,
}

/// The `{onSave, onClose}` side of a sub-editor.
pub trait EditorHost<D> {
    /// Commit the editor's working copy.
    fn on_save(&mut self, data: D) -> EditorResult<()>;

    /// The editor was dismissed.
    fn on_close(&mut self);
}

/// Common shape of every sub-editor.
pub trait SubEditor: Sized {
    type Data: Clone;

    /// Start editing a copy of `initial`.
    fn open(initial: Self::Data) -> Self;

    /// The current working copy.
    fn data(&self) -> &Self::Data;

    /// Commit the working copy. The editor stays open.
    fn save(&self, host: &mut dyn EditorHost<Self::Data>) -> EditorResult<()> {
        host.on_save(self.data().clone())
    }

    /// Dismiss the editor without committing.
    fn close(self, host: &mut dyn EditorHost<Self::Data>) {
        host.on_close();
    }
}

/// Open an editor on the current payload of block `id`, if it holds `E::Data`.
pub fn open_block<E>(doc: &Document, id: &BlockId) -> Option<E>
where
    E: SubEditor,
    E::Data: Payload,
{
    let leaf = doc.get(id)?.as_leaf()?;
    E::Data::from_leaf(leaf).cloned().map(E::open)
}

/// Open an editor on the payload of a populated split slot.
pub fn open_slot<E>(doc: &Document, id: &BlockId, slot: Slot) -> Option<E>
where
    E: SubEditor,
    E::Data: Payload,
{
    let sub = split::slot(doc, id, slot)?;
    E::Data::from_leaf(&sub.data).cloned().map(E::open)
}

fn to_patch<D: Payload>(id: &BlockId, data: &D) -> EditorResult<serde_json::Value> {
    serde_json::to_value(data).map_err(|e| EditorError::InvalidPatch {
        id: id.clone(),
        kind: D::KIND,
        details: e.to_string(),
    })
}

fn kind_mismatch(id: &BlockId, expected: BlockKind, found: BlockKind) -> EditorError {
    EditorError::InvalidPatch {
        id: id.clone(),
        kind: found,
        details: format!("a {expected} editor cannot save into a {found} block"),
    }
}

/// Commits a sub-editor into a top-level block through `update_data`.
pub struct BlockHost<'a> {
    doc: &'a mut Document,
    id: BlockId,
    closed: bool,
}

impl<'a> BlockHost<'a> {
    pub fn new(doc: &'a mut Document, id: BlockId) -> Self {
        Self {
            doc,
            id,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<D: Payload> EditorHost<D> for BlockHost<'_> {
    fn on_save(&mut self, data: D) -> EditorResult<()> {
        let Some(found) = self.doc.get(&self.id).map(|b| b.kind()) else {
            debug!(id = %self.id, "editor save: block no longer exists");
            return Ok(());
        };
        if found != D::KIND {
            return Err(kind_mismatch(&self.id, D::KIND, found));
        }
        let patch = to_patch(&self.id, &data)?;
        self.doc.update_data(&self.id, patch)
    }

    fn on_close(&mut self) {
        debug!(id = %self.id, "editor closed");
        self.closed = true;
    }
}

/// Commits a sub-editor into one slot of a split block.
pub struct SlotHost<'a> {
    doc: &'a mut Document,
    id: BlockId,
    slot: Slot,
    closed: bool,
}

impl<'a> SlotHost<'a> {
    pub fn new(doc: &'a mut Document, id: BlockId, slot: Slot) -> Self {
        Self {
            doc,
            id,
            slot,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<D: Payload> EditorHost<D> for SlotHost<'_> {
    fn on_save(&mut self, data: D) -> EditorResult<()> {
        let Some(found) = split::slot(self.doc, &self.id, self.slot).map(|s| s.kind()) else {
            debug!(id = %self.id, slot = %self.slot, "editor save: slot is empty or gone");
            return Ok(());
        };
        if found != D::KIND {
            return Err(kind_mismatch(&self.id, D::KIND, found));
        }
        let patch = to_patch(&self.id, &data)?;
        split::update_slot_data(self.doc, &self.id, self.slot, patch)
    }

    fn on_close(&mut self) {
        debug!(id = %self.id, slot = %self.slot, "slot editor closed");
        self.closed = true;
    }
}
