//! Lectern test utilities.
//!
//! Fixtures and fakes for integration tests: a document holding one block
//! of every kind, an in-memory rich-text surface, an editor host that
//! records what it receives, and a self-cleaning temporary directory.

use std::collections::HashSet;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use lectern_kernel::content::editors::EditorHost;
use lectern_kernel::content::{Document, RichTextCommand, RichTextSurface, Slot, factory, split};
use lectern_kernel::error::EditorResult;
use lectern_sdk::types::{
    AudioData, Block, BlockKind, CalloutData, CalloutType, CodeData, FileData, Flashcard,
    FlashcardDeckData, ImageData, ImageItem, LeafData, Question, QuizData, QuoteData, VideoData,
};

/// A document with one block of every kind, in toolbar order, with
/// enough content that conditional elements (media players, quote author,
/// quiz explanation) are present. The split's left slot holds text and
/// the right slot is empty.
pub fn every_kind_document() -> Document {
    let mut doc = Document::new();
    for kind in BlockKind::ALL {
        doc.insert_block(filled_block(kind), None);
    }
    let split_id = doc.iter().find(|b| b.kind() == BlockKind::Split).map(|b| b.id.clone());
    if let Some(split_id) = split_id
        && split::populate_slot(&mut doc, &split_id, Slot::Left, BlockKind::Text).is_ok()
    {
        let _ = split::update_slot_content(&mut doc, &split_id, Slot::Left, "<p>Left side</p>");
    }
    doc
}

/// A block of `kind` with representative data filled in.
pub fn filled_block(kind: BlockKind) -> Block {
    let block = factory::new_block(kind);
    let data = match kind {
        BlockKind::Text => return block.with_content("<p>Hello <strong>class</strong></p>"),
        BlockKind::Accordion => return block.with_content("<p>Hidden detail</p>"),
        BlockKind::Image => LeafData::Image(ImageData {
            items: vec![ImageItem {
                url: "https://example.com/cell.png".into(),
                caption: "A cell".into(),
            }],
            columns: 1,
        }),
        BlockKind::Video => LeafData::Video(VideoData {
            url: "https://example.com/intro.mp4".into(),
            caption: "Intro".into(),
        }),
        BlockKind::Audio => LeafData::Audio(AudioData {
            url: "https://example.com/clip.mp3".into(),
            title: "Pronunciation".into(),
        }),
        BlockKind::File => LeafData::File(FileData {
            url: "https://example.com/notes.pdf".into(),
            name: "notes.pdf".into(),
            mime_type: "application/pdf".into(),
            size: 1024,
        }),
        BlockKind::Quiz => LeafData::Quiz(QuizData {
            title: "Check".into(),
            questions: vec![Question {
                id: "q1".into(),
                question: "2 + 2?".into(),
                options: vec!["3".into(), "4".into()],
                correct_answer: 1,
                explanation: "Basic arithmetic".into(),
            }],
        }),
        BlockKind::FlashcardDeck => LeafData::FlashcardDeck(FlashcardDeckData {
            title: "Words".into(),
            cards: vec![Flashcard {
                id: "c1".into(),
                front: "hola".into(),
                back: "hello".into(),
            }],
        }),
        BlockKind::Callout => LeafData::Callout(CalloutData {
            tone: CalloutType::Warning,
            title: "Careful".into(),
            text: "Hot surface".into(),
        }),
        BlockKind::Quote => LeafData::Quote(QuoteData {
            text: "Know thyself".into(),
            author: "Socrates".into(),
        }),
        BlockKind::Code => LeafData::Code(CodeData {
            language: "rust".into(),
            code: "fn main() {}".into(),
        }),
        _ => return block,
    };
    Block { data: data.into(), ..block }
}

/// In-memory stand-in for a browser rich-text surface.
///
/// Formatting commands wrap the whole HTML in the matching tag and toggle
/// the command's active state; undo and redo walk a history stack.
#[derive(Debug, Default)]
pub struct MemorySurface {
    html: String,
    active: HashSet<RichTextCommand>,
    undo: Vec<String>,
    redo: Vec<String>,
    pub executed: Vec<RichTextCommand>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate typing: replace the HTML as a user edit would.
    pub fn type_html(&mut self, html: &str) {
        self.undo.push(std::mem::replace(&mut self.html, html.to_string()));
        self.redo.clear();
    }

    fn wrap(&mut self, tag: &str) {
        let next = format!("<{tag}>{}</{tag}>", self.html);
        self.type_html(&next);
    }
}

impl RichTextSurface for MemorySurface {
    fn load(&mut self, html: &str) {
        self.html = html.to_string();
        self.undo.clear();
        self.redo.clear();
        self.active.clear();
    }

    fn html(&self) -> String {
        self.html.clone()
    }

    fn exec(&mut self, command: RichTextCommand, argument: Option<&str>) -> bool {
        self.executed.push(command);
        match command {
            RichTextCommand::Undo => match self.undo.pop() {
                Some(prev) => {
                    self.redo.push(std::mem::replace(&mut self.html, prev));
                    true
                }
                None => false,
            },
            RichTextCommand::Redo => match self.redo.pop() {
                Some(next) => {
                    self.undo.push(std::mem::replace(&mut self.html, next));
                    true
                }
                None => false,
            },
            RichTextCommand::InsertLink => {
                let url = argument.unwrap_or_default();
                let next = format!("{}<a href=\"{url}\">{url}</a>", self.html);
                self.type_html(&next);
                true
            }
            RichTextCommand::InsertImage => {
                let url = argument.unwrap_or_default();
                let next = format!("{}<img src=\"{url}\">", self.html);
                self.type_html(&next);
                true
            }
            RichTextCommand::RemoveFormat => {
                self.active.clear();
                false
            }
            RichTextCommand::Bold => {
                self.wrap("strong");
                self.active.insert(command);
                true
            }
            RichTextCommand::Italic => {
                self.wrap("em");
                self.active.insert(command);
                true
            }
            _ => {
                self.active.insert(command);
                false
            }
        }
    }

    fn is_active(&self, command: RichTextCommand) -> bool {
        self.active.contains(&command)
    }
}

/// Editor host that records every save and close.
#[derive(Debug)]
pub struct RecordingHost<D> {
    pub saved: Vec<D>,
    pub closed: bool,
}

impl<D> Default for RecordingHost<D> {
    fn default() -> Self {
        Self {
            saved: Vec::new(),
            closed: false,
        }
    }
}

impl<D> RecordingHost<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_saved(&self) -> Option<&D> {
        self.saved.last()
    }
}

impl<D> EditorHost<D> for RecordingHost<D> {
    fn on_save(&mut self, data: D) -> EditorResult<()> {
        self.saved.push(data);
        Ok(())
    }

    fn on_close(&mut self) {
        self.closed = true;
    }
}

static TEST_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Temporary directory removed on drop.
pub struct TestDir(PathBuf);

impl TestDir {
    pub fn new(name: &str) -> Self {
        let n = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir()
            .join(format!("lectern_test_{name}_{n}_{}", std::process::id()));
        // Remove leftovers from a previous run, if any
        let _ = std::fs::remove_dir_all(&path);
        if let Err(e) = std::fs::create_dir_all(&path) {
            panic!("failed to create {}: {e}", path.display());
        }
        Self(path)
    }

    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.0.join(name);
        if let Err(e) = std::fs::write(&path, contents) {
            panic!("failed to write {}: {e}", path.display());
        }
        path
    }
}

impl Deref for TestDir {
    type Target = Path;
    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for TestDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
