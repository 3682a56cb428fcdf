//! Lesson document types.
//!
//! A lesson is an ordered list of [`Block`]s. Each block carries an id, an
//! optional rich-text `content` string and a kind-specific payload. The
//! payload is a closed sum type: [`BlockData`] is either a leaf payload
//! ([`LeafData`]) or a split layout ([`SplitData`]) whose two slots hold
//! [`SubBlock`]s. A sub-block only ever holds a [`LeafData`], so a split can
//! never contain another split.
//!
//! On the wire every block is a flat record `{ id, kind, content?, data? }`.
//! Conversion between the record and the typed form happens in the serde
//! `try_from`/`into` hooks so persistence never sees the Rust enum layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Opaque, time-sortable block identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh identifier (UUIDv7: millisecond timestamp plus random bits).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Generate an id for an entry nested inside a payload (quiz question, flashcard).
pub fn generate_entry_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// The closed set of block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Text,
    Image,
    Video,
    Quiz,
    FlashcardDeck,
    Callout,
    Split,
    Quote,
    Divider,
    Table,
    List,
    Audio,
    Accordion,
    Steps,
    File,
    Code,
}

impl BlockKind {
    /// Every kind, in toolbar order.
    pub const ALL: [BlockKind; 16] = [
        BlockKind::Text,
        BlockKind::Image,
        BlockKind::Video,
        BlockKind::Quiz,
        BlockKind::FlashcardDeck,
        BlockKind::Callout,
        BlockKind::Split,
        BlockKind::Quote,
        BlockKind::Divider,
        BlockKind::Table,
        BlockKind::List,
        BlockKind::Audio,
        BlockKind::Accordion,
        BlockKind::Steps,
        BlockKind::File,
        BlockKind::Code,
    ];

    /// Machine name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Video => "video",
            BlockKind::Quiz => "quiz",
            BlockKind::FlashcardDeck => "flashcard-deck",
            BlockKind::Callout => "callout",
            BlockKind::Split => "split",
            BlockKind::Quote => "quote",
            BlockKind::Divider => "divider",
            BlockKind::Table => "table",
            BlockKind::List => "list",
            BlockKind::Audio => "audio",
            BlockKind::Accordion => "accordion",
            BlockKind::Steps => "steps",
            BlockKind::File => "file",
            BlockKind::Code => "code",
        }
    }

    /// Kinds whose primary payload is the rich-text `content` string.
    pub fn is_prose(self) -> bool {
        matches!(self, BlockKind::Text | BlockKind::Accordion)
    }

    /// Kinds that carry no structured `data` at all.
    pub fn has_payload(self) -> bool {
        !matches!(self, BlockKind::Text | BlockKind::Divider)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DataError::UnknownKind(s.to_string()))
    }
}

/// Errors raised while converting wire records into typed blocks.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unknown block kind '{0}'")]
    UnknownKind(String),

    #[error("a split block cannot be nested inside another split")]
    NestedSplit,

    #[error("{kind}: payload does not match the expected shape: {source}")]
    Shape {
        kind: BlockKind,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Per-kind payloads
// ---------------------------------------------------------------------------

/// One picture in an image block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageItem {
    pub url: String,
    pub caption: String,
}

/// Image gallery. Editors currently surface only the first item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageData {
    pub items: Vec<ImageItem>,
    pub columns: u8,
}

impl Default for ImageData {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            columns: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoData {
    pub url: String,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioData {
    pub url: String,
    pub title: String,
}

/// Downloadable attachment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileData {
    pub url: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

/// A multiple-choice question. `correct_answer` indexes into `options`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizData {
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlashcardDeckData {
    pub title: String,
    pub cards: Vec<Flashcard>,
}

/// Visual tone of a callout box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutType {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

impl CalloutType {
    pub fn as_str(self) -> &'static str {
        match self {
            CalloutType::Info => "info",
            CalloutType::Warning => "warning",
            CalloutType::Success => "success",
            CalloutType::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalloutData {
    #[serde(rename = "type")]
    pub tone: CalloutType,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteData {
    pub text: String,
    pub author: String,
}

/// Header row plus a grid of cells. Every row should be as wide as
/// `headers`; readers must still cope with ragged rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    /// Cell text, or `""` when the row is shorter than the header.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|r| r.len() == self.headers.len())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    #[default]
    Unordered,
    Ordered,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListData {
    pub style: ListStyle,
    pub items: Vec<String>,
}

/// Collapsible section; the body lives in the block's `content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccordionData {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Step {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepsData {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeData {
    pub language: String,
    pub code: String,
}

/// Two side-by-side slots, each empty or holding one sub-block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitData {
    pub left: Option<SubBlock>,
    pub right: Option<SubBlock>,
}

// ---------------------------------------------------------------------------
// Sum types
// ---------------------------------------------------------------------------

/// Payload of every kind that may appear outside a split.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafData {
    Text,
    Image(ImageData),
    Video(VideoData),
    Quiz(QuizData),
    FlashcardDeck(FlashcardDeckData),
    Callout(CalloutData),
    Quote(QuoteData),
    Divider,
    Table(TableData),
    List(ListData),
    Audio(AudioData),
    Accordion(AccordionData),
    Steps(StepsData),
    File(FileData),
    Code(CodeData),
}

impl LeafData {
    pub fn kind(&self) -> BlockKind {
        match self {
            LeafData::Text => BlockKind::Text,
            LeafData::Image(_) => BlockKind::Image,
            LeafData::Video(_) => BlockKind::Video,
            LeafData::Quiz(_) => BlockKind::Quiz,
            LeafData::FlashcardDeck(_) => BlockKind::FlashcardDeck,
            LeafData::Callout(_) => BlockKind::Callout,
            LeafData::Quote(_) => BlockKind::Quote,
            LeafData::Divider => BlockKind::Divider,
            LeafData::Table(_) => BlockKind::Table,
            LeafData::List(_) => BlockKind::List,
            LeafData::Audio(_) => BlockKind::Audio,
            LeafData::Accordion(_) => BlockKind::Accordion,
            LeafData::Steps(_) => BlockKind::Steps,
            LeafData::File(_) => BlockKind::File,
            LeafData::Code(_) => BlockKind::Code,
        }
    }

    /// Wire form of the payload; `None` for kinds without one.
    pub fn to_value(&self) -> Option<Value> {
        let value = match self {
            LeafData::Text | LeafData::Divider => return None,
            LeafData::Image(d) => serde_json::to_value(d),
            LeafData::Video(d) => serde_json::to_value(d),
            LeafData::Quiz(d) => serde_json::to_value(d),
            LeafData::FlashcardDeck(d) => serde_json::to_value(d),
            LeafData::Callout(d) => serde_json::to_value(d),
            LeafData::Quote(d) => serde_json::to_value(d),
            LeafData::Table(d) => serde_json::to_value(d),
            LeafData::List(d) => serde_json::to_value(d),
            LeafData::Audio(d) => serde_json::to_value(d),
            LeafData::Accordion(d) => serde_json::to_value(d),
            LeafData::Steps(d) => serde_json::to_value(d),
            LeafData::File(d) => serde_json::to_value(d),
            LeafData::Code(d) => serde_json::to_value(d),
        };
        // Payload structs only hold strings, numbers and vectors.
        value.ok()
    }

    /// Read a payload of `kind` from its wire form.
    ///
    /// A missing or `null` payload yields the kind's empty shape. Payloads
    /// of kinds without data are ignored.
    pub fn from_value(kind: BlockKind, data: Option<Value>) -> Result<Self, DataError> {
        let data = data.filter(|v| !v.is_null());
        Ok(match kind {
            BlockKind::Split => return Err(DataError::NestedSplit),
            BlockKind::Text => LeafData::Text,
            BlockKind::Divider => LeafData::Divider,
            BlockKind::Image => LeafData::Image(parse_payload(kind, data)?),
            BlockKind::Video => LeafData::Video(parse_payload(kind, data)?),
            BlockKind::Quiz => LeafData::Quiz(parse_payload(kind, data)?),
            BlockKind::FlashcardDeck => LeafData::FlashcardDeck(parse_payload(kind, data)?),
            BlockKind::Callout => LeafData::Callout(parse_payload(kind, data)?),
            BlockKind::Quote => LeafData::Quote(parse_payload(kind, data)?),
            BlockKind::Table => LeafData::Table(parse_payload(kind, data)?),
            BlockKind::List => LeafData::List(parse_payload(kind, data)?),
            BlockKind::Audio => LeafData::Audio(parse_payload(kind, data)?),
            BlockKind::Accordion => LeafData::Accordion(parse_payload(kind, data)?),
            BlockKind::Steps => LeafData::Steps(parse_payload(kind, data)?),
            BlockKind::File => LeafData::File(parse_payload(kind, data)?),
            BlockKind::Code => LeafData::Code(parse_payload(kind, data)?),
        })
    }
}

fn parse_payload<T>(kind: BlockKind, data: Option<Value>) -> Result<T, DataError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match data {
        None => Ok(T::default()),
        Some(v) => serde_json::from_value(v).map_err(|source| DataError::Shape { kind, source }),
    }
}

/// Payload of a top-level block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockData {
    Leaf(LeafData),
    Split(SplitData),
}

impl BlockData {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockData::Leaf(leaf) => leaf.kind(),
            BlockData::Split(_) => BlockKind::Split,
        }
    }

    pub fn to_value(&self) -> Option<Value> {
        match self {
            BlockData::Leaf(leaf) => leaf.to_value(),
            BlockData::Split(split) => serde_json::to_value(split).ok(),
        }
    }

    pub fn from_value(kind: BlockKind, data: Option<Value>) -> Result<Self, DataError> {
        if kind == BlockKind::Split {
            return Ok(BlockData::Split(parse_payload(kind, data.filter(|v| !v.is_null()))?));
        }
        LeafData::from_value(kind, data).map(BlockData::Leaf)
    }
}

impl From<LeafData> for BlockData {
    fn from(leaf: LeafData) -> Self {
        BlockData::Leaf(leaf)
    }
}

impl From<SplitData> for BlockData {
    fn from(split: SplitData) -> Self {
        BlockData::Split(split)
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// One top-level element of a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BlockRecord", into = "BlockRecord")]
pub struct Block {
    pub id: BlockId,
    pub content: Option<String>,
    pub data: BlockData,
}

impl Block {
    /// Create a block with a freshly generated id.
    pub fn new(data: impl Into<BlockData>) -> Self {
        Self {
            id: BlockId::generate(),
            content: None,
            data: data.into(),
        }
    }

    pub fn with_content(mut self, html: impl Into<String>) -> Self {
        self.content = Some(html.into());
        self
    }

    pub fn kind(&self) -> BlockKind {
        self.data.kind()
    }

    pub fn as_leaf(&self) -> Option<&LeafData> {
        match &self.data {
            BlockData::Leaf(leaf) => Some(leaf),
            BlockData::Split(_) => None,
        }
    }

    pub fn as_split(&self) -> Option<&SplitData> {
        match &self.data {
            BlockData::Split(split) => Some(split),
            BlockData::Leaf(_) => None,
        }
    }

    pub fn as_split_mut(&mut self) -> Option<&mut SplitData> {
        match &mut self.data {
            BlockData::Split(split) => Some(split),
            BlockData::Leaf(_) => None,
        }
    }
}

/// Id-less, non-nestable block living in a split slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SubBlockRecord", into = "SubBlockRecord")]
pub struct SubBlock {
    pub content: Option<String>,
    pub data: LeafData,
}

impl SubBlock {
    pub fn new(data: LeafData) -> Self {
        Self {
            content: None,
            data,
        }
    }

    pub fn with_content(mut self, html: impl Into<String>) -> Self {
        self.content = Some(html.into());
        self
    }

    pub fn kind(&self) -> BlockKind {
        self.data.kind()
    }
}

/// Flat wire record for a block: `{ id, kind, content?, data? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: BlockId,
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl TryFrom<BlockRecord> for Block {
    type Error = DataError;

    fn try_from(record: BlockRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            content: record.content,
            data: BlockData::from_value(record.kind, record.data)?,
        })
    }
}

impl From<Block> for BlockRecord {
    fn from(block: Block) -> Self {
        Self {
            id: block.id,
            kind: block.data.kind(),
            content: block.content,
            data: block.data.to_value(),
        }
    }
}

/// Flat wire record for a sub-block: `{ kind, content?, data? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubBlockRecord {
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl TryFrom<SubBlockRecord> for SubBlock {
    type Error = DataError;

    fn try_from(record: SubBlockRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            content: record.content,
            data: LeafData::from_value(record.kind, record.data)?,
        })
    }
}

impl From<SubBlock> for SubBlockRecord {
    fn from(sub: SubBlock) -> Self {
        Self {
            kind: sub.data.kind(),
            content: sub.content,
            data: sub.data.to_value(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in BlockKind::ALL {
            assert_eq!(kind.as_str().parse::<BlockKind>().unwrap(), kind);
        }
        assert!(matches!(
            "carousel".parse::<BlockKind>(),
            Err(DataError::UnknownKind(name)) if name == "carousel"
        ));
    }

    #[test]
    fn serde_kind_name_matches_as_str() {
        let value = serde_json::to_value(BlockKind::FlashcardDeck).unwrap();
        assert_eq!(value, json!("flashcard-deck"));
    }

    #[test]
    fn block_serializes_as_flat_record() {
        let block = Block {
            id: BlockId::from("b1"),
            content: None,
            data: BlockData::Leaf(LeafData::Quote(QuoteData {
                text: "Stay hungry".into(),
                author: "Anon".into(),
            })),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "b1",
                "kind": "quote",
                "data": { "text": "Stay hungry", "author": "Anon" }
            })
        );
    }

    #[test]
    fn text_block_omits_data() {
        let block = Block {
            id: BlockId::from("t"),
            content: Some("<p>Hi</p>".into()),
            data: LeafData::Text.into(),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value, json!({ "id": "t", "kind": "text", "content": "<p>Hi</p>" }));
    }

    #[test]
    fn quiz_uses_camel_case_correct_answer() {
        let value = json!({
            "id": "q",
            "kind": "quiz",
            "data": {
                "title": "T",
                "questions": [
                    { "id": "a", "question": "2+2?", "options": ["3", "4"], "correctAnswer": 1 }
                ]
            }
        });
        let block: Block = serde_json::from_value(value).unwrap();
        let Some(LeafData::Quiz(quiz)) = block.as_leaf() else {
            panic!("expected quiz payload");
        };
        assert_eq!(quiz.questions[0].correct_answer, 1);
        assert_eq!(quiz.questions[0].explanation, "");
    }

    #[test]
    fn missing_data_yields_empty_shape() {
        let block: Block =
            serde_json::from_value(json!({ "id": "x", "kind": "table" })).unwrap();
        assert_eq!(
            block.data,
            BlockData::Leaf(LeafData::Table(TableData::default()))
        );
    }

    #[test]
    fn unknown_kind_fails_to_load() {
        let result: Result<Block, _> =
            serde_json::from_value(json!({ "id": "x", "kind": "carousel" }));
        assert!(result.is_err());
    }

    #[test]
    fn split_with_slots_round_trips() {
        let value = json!({
            "id": "s",
            "kind": "split",
            "data": {
                "left": { "kind": "text", "content": "<p>L</p>" },
                "right": null
            }
        });
        let block: Block = serde_json::from_value(value.clone()).unwrap();
        let split = block.as_split().unwrap();
        assert_eq!(split.left.as_ref().unwrap().kind(), BlockKind::Text);
        assert!(split.right.is_none());
        assert_eq!(serde_json::to_value(&block).unwrap(), value);
    }

    #[test]
    fn nested_split_is_rejected() {
        let value = json!({
            "id": "s",
            "kind": "split",
            "data": { "left": { "kind": "split" }, "right": null }
        });
        let result: Result<Block, _> = serde_json::from_value(value);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot be nested"), "unexpected error: {err}");
    }

    #[test]
    fn wrong_payload_shape_is_reported() {
        let err = LeafData::from_value(BlockKind::Table, Some(json!({ "headers": 3 })))
            .unwrap_err();
        assert!(matches!(err, DataError::Shape { kind: BlockKind::Table, .. }));
    }

    #[test]
    fn ragged_table_cells_read_as_empty() {
        let table = TableData {
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec!["1".into()]],
        };
        assert_eq!(table.cell(0, 0), "1");
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(5, 0), "");
        assert!(!table.is_rectangular());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = BlockId::generate();
        let b = BlockId::generate();
        assert_ne!(a, b);
    }
}
