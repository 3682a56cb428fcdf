//! Block payload factory.
//!
//! The single producer of block kinds: every new block and every populated
//! split slot starts from the shapes below. Other components validate
//! against the same shapes.

use lectern_sdk::types::{
    AccordionData, AudioData, Block, BlockData, BlockId, BlockKind, CalloutData, CalloutType, CodeData,
    FileData, FlashcardDeckData, ImageData, ImageItem, LeafData, ListData, ListStyle, QuizData,
    QuoteData, SplitData, Step, StepsData, SubBlock, TableData, VideoData,
};

use crate::error::{EditorError, EditorResult};

pub const DEFAULT_QUIZ_TITLE: &str = "Untitled quiz";
pub const DEFAULT_DECK_TITLE: &str = "Untitled deck";
pub const DEFAULT_CALLOUT_TITLE: &str = "Note";
pub const DEFAULT_ACCORDION_TITLE: &str = "Untitled section";

/// Number of columns and rows a fresh table starts with.
pub const DEFAULT_TABLE_COLUMNS: usize = 2;
pub const DEFAULT_TABLE_ROWS: usize = 2;

/// Default payload for a non-split kind. Returns `None` for `split`, which
/// has no leaf form.
pub fn default_leaf(kind: BlockKind) -> Option<LeafData> {
    let leaf = match kind {
        BlockKind::Split => return None,
        BlockKind::Text => LeafData::Text,
        BlockKind::Divider => LeafData::Divider,
        BlockKind::Image => LeafData::Image(ImageData {
            items: vec![ImageItem::default()],
            columns: 1,
        }),
        BlockKind::Video => LeafData::Video(VideoData::default()),
        BlockKind::Audio => LeafData::Audio(AudioData::default()),
        BlockKind::File => LeafData::File(FileData::default()),
        BlockKind::Quiz => LeafData::Quiz(QuizData {
            title: DEFAULT_QUIZ_TITLE.to_string(),
            questions: Vec::new(),
        }),
        BlockKind::FlashcardDeck => LeafData::FlashcardDeck(FlashcardDeckData {
            title: DEFAULT_DECK_TITLE.to_string(),
            cards: Vec::new(),
        }),
        BlockKind::Callout => LeafData::Callout(CalloutData {
            tone: CalloutType::Info,
            title: DEFAULT_CALLOUT_TITLE.to_string(),
            text: String::new(),
        }),
        BlockKind::Quote => LeafData::Quote(QuoteData::default()),
        BlockKind::Table => LeafData::Table(TableData {
            headers: (1..=DEFAULT_TABLE_COLUMNS)
                .map(|n| format!("Column {n}"))
                .collect(),
            rows: vec![vec![String::new(); DEFAULT_TABLE_COLUMNS]; DEFAULT_TABLE_ROWS],
        }),
        BlockKind::List => LeafData::List(ListData {
            style: ListStyle::Unordered,
            items: vec![String::new()],
        }),
        BlockKind::Accordion => LeafData::Accordion(AccordionData {
            title: DEFAULT_ACCORDION_TITLE.to_string(),
        }),
        BlockKind::Steps => LeafData::Steps(StepsData {
            steps: (1..=2)
                .map(|n| Step {
                    title: format!("Step {n}"),
                    description: String::new(),
                })
                .collect(),
        }),
        BlockKind::Code => LeafData::Code(CodeData::default()),
    };
    Some(leaf)
}

/// Default payload for any kind.
pub fn default_data(kind: BlockKind) -> BlockData {
    match default_leaf(kind) {
        Some(leaf) => BlockData::Leaf(leaf),
        None => BlockData::Split(SplitData::default()),
    }
}

/// Default payload for a kind given by its wire name.
pub fn default_data_for_name(name: &str) -> EditorResult<BlockData> {
    let kind: BlockKind = name
        .parse()
        .map_err(|_| EditorError::UnknownKind(name.to_string()))?;
    Ok(default_data(kind))
}

/// Initial `content` for a kind: an empty HTML string for prose kinds.
pub fn default_content(kind: BlockKind) -> Option<String> {
    kind.is_prose().then(String::new)
}

/// Build a blank block with a fresh id.
pub fn new_block(kind: BlockKind) -> Block {
    Block {
        id: BlockId::generate(),
        content: default_content(kind),
        data: default_data(kind),
    }
}

/// Build a blank sub-block. Splits cannot be sub-blocks.
pub fn new_sub_block(kind: BlockKind) -> EditorResult<SubBlock> {
    let data = default_leaf(kind).ok_or(EditorError::KindNotAllowedInSlot { kind })?;
    Ok(SubBlock {
        content: default_content(kind),
        data,
    })
}
