//! Editable renderer.
//!
//! Draws the same display structure as the read-only renderer and adds
//! authoring controls around it: block toolbar buttons, slot pickers,
//! sub-editor launchers and panels, the rich-text toolbar and
//! `contenteditable` markers on prose. Every control is a `control`
//! element, so stripping controls from this tree yields the read-only
//! tree's structure.

use lectern_sdk::render::{
    ElementBuilder, RenderElement, container, control, control_group, filtered_markup, input,
    link, markup, void,
};
use lectern_sdk::types::{
    AudioData, Block, BlockData, BlockId, BlockKind, CalloutData, CodeData, FileData,
    FlashcardDeckData, ImageData, LeafData, ListData, ListStyle, QuizData, QuoteData, SplitData,
    StepsData, SubBlock, TableData, VideoData,
};
use serde_json::Value;

use super::filter::{FILTERED_HTML, FULL_HTML, html_escape};
use crate::content::block_types::BlockKindRegistry;
use crate::content::document::Document;
use crate::content::rich_text::{RichTextCommand, RichTextSurface};
use crate::content::split::{Slot, available_kinds};
use crate::session::{EditorSession, OpenEditor};

/// Kinds with a dedicated sub-editor.
const EDITOR_KINDS: &[BlockKind] = &[
    BlockKind::Quiz,
    BlockKind::FlashcardDeck,
    BlockKind::Table,
    BlockKind::Steps,
    BlockKind::List,
];

/// Kinds that accept an ingested file.
const UPLOAD_KINDS: &[BlockKind] = &[
    BlockKind::Image,
    BlockKind::Video,
    BlockKind::Audio,
    BlockKind::File,
];

/// Renders a document for authors.
pub struct EditableRenderer<'a> {
    session: &'a EditorSession,
    registry: &'a BlockKindRegistry,
    surface: Option<&'a dyn RichTextSurface>,
}

impl<'a> EditableRenderer<'a> {
    pub fn new(session: &'a EditorSession, registry: &'a BlockKindRegistry) -> Self {
        Self {
            session,
            registry,
            surface: None,
        }
    }

    /// Attach the rich-text surface bound to the focused block, so the
    /// formatting toolbar can show active commands.
    pub fn with_surface(mut self, surface: &'a dyn RichTextSurface) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn render(&self, doc: &Document) -> RenderElement {
        let len = doc.len();
        doc.iter()
            .enumerate()
            .fold(container("article").class("lesson"), |lesson, (index, block)| {
                lesson.item(self.render_block(block, index, len))
            })
            .child("insert", self.insert_toolbar())
            .build()
    }

    /// Buttons that append a new block of each kind.
    fn insert_toolbar(&self) -> RenderElement {
        self.registry
            .toolbar()
            .into_iter()
            .fold(control_group("nav").class("insert-toolbar"), |bar, def| {
                bar.item(
                    control("insert", &def.label)
                        .attr("data-kind", def.kind.as_str())
                        .build(),
                )
            })
            .weight(i32::MAX)
            .build()
    }

    pub fn render_block(&self, block: &Block, index: usize, len: usize) -> RenderElement {
        let kind = block.kind();
        let id = block.id.as_str();
        let body = match &block.data {
            BlockData::Leaf(leaf) => render_leaf(leaf, block.content.as_deref()),
            BlockData::Split(split) => self.render_split(&block.id, split),
        };

        let mut wrapper = container("section")
            .class("block")
            .attr("data-kind", kind.as_str())
            .attr("data-block-id", id);
        if self.session.is_focused(&block.id) {
            wrapper = wrapper.class("is-focused");
        }

        let mut move_up = control("move-up", "Move up").attr("data-block-id", id);
        if index == 0 {
            move_up = move_up.attr("disabled", "disabled");
        }
        let mut move_down = control("move-down", "Move down").attr("data-block-id", id);
        if index + 1 >= len {
            move_down = move_down.attr("disabled", "disabled");
        }
        wrapper = wrapper
            .child("move_up", move_up.weight(-4).build())
            .child("move_down", move_down.weight(-3).build())
            .child(
                "duplicate",
                control("duplicate", "Duplicate").attr("data-block-id", id).weight(-2).build(),
            )
            .child(
                "remove",
                control("remove", "Remove").attr("data-block-id", id).weight(-1).build(),
            );

        if let Some(launcher) = launcher(kind, id, None) {
            wrapper = wrapper.child("launch", launcher);
        }
        if kind.is_prose()
            && self.session.is_focused(&block.id)
            && let Some(surface) = self.surface
        {
            wrapper = wrapper.child("toolbar", toolbar(surface));
        }
        if let (Some(open), BlockData::Leaf(leaf)) = (self.session.editor_for(&block.id), &block.data)
        {
            wrapper = wrapper.child("editor", editor_panel(open, leaf));
        }

        wrapper.child("body", body).build()
    }

    fn render_split(&self, id: &BlockId, split: &SplitData) -> RenderElement {
        let mut b = container("div").class("split");
        for (weight, slot) in (0..).zip(Slot::BOTH) {
            let key = slot.as_str();
            match slot.get(split) {
                Some(sub) => {
                    b = b.child(key, self.render_slot(id, slot, sub).weight(weight).build());
                }
                None => {
                    b = b.child(&format!("{key}_add"), self.slot_picker(id, slot));
                }
            }
        }
        b.build()
    }

    fn render_slot(&self, id: &BlockId, slot: Slot, sub: &SubBlock) -> ElementBuilder {
        let mut b = container("div")
            .class("split__slot")
            .attr("data-kind", sub.kind().as_str())
            .child(
                "clear",
                control("clear-slot", "Clear")
                    .attr("data-block-id", id.as_str())
                    .attr("data-slot", slot.as_str())
                    .build(),
            );
        if let Some(launcher) = launcher(sub.kind(), id.as_str(), Some(slot)) {
            b = b.child("launch", launcher);
        }
        if let Some(open) = self.session.editor_for_slot(id, slot) {
            b = b.child("editor", editor_panel(open, &sub.data));
        }
        b.child("body", render_leaf(&sub.data, sub.content.as_deref()))
    }

    /// "Add content" affordance for an empty slot, expanded into the
    /// restricted kind list while the picker is open.
    fn slot_picker(&self, id: &BlockId, slot: Slot) -> RenderElement {
        if !self.session.is_picking(id, slot) {
            return control("open-slot-picker", "Add content")
                .attr("data-block-id", id.as_str())
                .attr("data-slot", slot.as_str())
                .build();
        }
        available_kinds()
            .iter()
            .fold(control_group("div").class("slot-picker"), |picker, kind| {
                let label = self
                    .registry
                    .get(*kind)
                    .map(|d| d.label.as_str())
                    .unwrap_or(kind.as_str());
                picker.item(
                    control("populate-slot", label)
                        .attr("data-block-id", id.as_str())
                        .attr("data-slot", slot.as_str())
                        .attr("data-kind", kind.as_str())
                        .build(),
                )
            })
            .build()
    }
}

/// Button that opens the sub-editor (or the upload dialog) for a kind.
fn launcher(kind: BlockKind, id: &str, slot: Option<Slot>) -> Option<RenderElement> {
    let b = if EDITOR_KINDS.contains(&kind) {
        control("open-editor", "Edit")
    } else if UPLOAD_KINDS.contains(&kind) {
        control("upload", "Choose file")
    } else if kind.has_payload() && !kind.is_prose() && kind != BlockKind::Split {
        control("open-editor", "Edit")
    } else {
        return None;
    };
    let mut b = b.attr("data-block-id", id).attr("data-kind", kind.as_str());
    if let Some(slot) = slot {
        b = b.attr("data-slot", slot.as_str());
    }
    Some(b.build())
}

/// Formatting toolbar for the focused prose block.
pub fn toolbar(surface: &dyn RichTextSurface) -> RenderElement {
    RichTextCommand::ALL
        .into_iter()
        .fold(control_group("div").class("rich-text-toolbar"), |bar, command| {
            let mut button = control("format", command.label()).attr("data-command", command.as_str());
            if surface.is_active(command) {
                button = button.class("is-active").attr("aria-pressed", "true");
            }
            bar.item(button.build())
        })
        .build()
}

/// Sub-editor panel: one input per editable field, plus the editor's actions.
fn editor_panel(open: &OpenEditor, leaf: &LeafData) -> RenderElement {
    let kind = leaf.kind();
    let mut panel = control_group("div")
        .class("editor-panel")
        .attr("data-editor", open.kind.as_str());
    for action in editor_actions(kind) {
        panel = panel.item(control(action, &action.replace('-', " ")).build());
    }
    if let Some(Value::Object(fields)) = leaf.to_value() {
        for (key, value) in &fields {
            panel = field_inputs(panel, key, value);
        }
    }
    panel
        .child("save", control("save-editor", "Save").weight(i32::MAX - 1).build())
        .child("close", control("close-editor", "Close").weight(i32::MAX).build())
        .build()
}

fn editor_actions(kind: BlockKind) -> &'static [&'static str] {
    match kind {
        BlockKind::Quiz => &["add-question"],
        BlockKind::FlashcardDeck => &["add-card"],
        BlockKind::Table => &["add-row", "add-column"],
        BlockKind::Steps => &["add-step"],
        BlockKind::List => &["add-item", "toggle-style"],
        _ => &[],
    }
}

/// Flatten a payload field into inputs named by path (`rows[1][0]`,
/// `questions[0].options[2]`). Array entries get a remove button.
fn field_inputs(mut panel: ElementBuilder, path: &str, value: &Value) -> ElementBuilder {
    match value {
        Value::String(s) => panel.item(input(path, s).build()),
        Value::Number(n) => panel.item(input(path, &n.to_string()).attr("type", "number").build()),
        Value::Bool(b) => panel.item(input(path, &b.to_string()).attr("type", "checkbox").build()),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                panel = field_inputs(panel, &item_path, item);
                panel = panel.item(
                    control("remove-entry", "Remove")
                        .attr("data-field", &item_path)
                        .build(),
                );
            }
            panel
        }
        Value::Object(fields) => {
            for (key, v) in fields {
                panel = field_inputs(panel, &format!("{path}.{key}"), v);
            }
            panel
        }
        Value::Null => panel,
    }
}

fn render_leaf(leaf: &LeafData, content: Option<&str>) -> RenderElement {
    match leaf {
        LeafData::Text => editable_prose("div", content),
        LeafData::Accordion(accordion) => container("details")
            .class("accordion")
            .attr("open", "open")
            .child("summary", markup("summary", &accordion.title).weight(0).build())
            .child("content", editable_prose("div", content))
            .build(),
        LeafData::Image(image) => render_image(image),
        LeafData::Video(video) => render_video(video),
        LeafData::Audio(audio) => render_audio(audio),
        LeafData::File(file) => render_file(file),
        LeafData::Quiz(quiz) => render_quiz(quiz),
        LeafData::FlashcardDeck(deck) => render_deck(deck),
        LeafData::Callout(callout) => render_callout(callout),
        LeafData::Quote(quote) => render_quote(quote),
        LeafData::Divider => void("hr").build(),
        LeafData::Table(table) => render_table(table),
        LeafData::List(list) => render_list(list),
        LeafData::Steps(steps) => render_steps(steps),
        LeafData::Code(code) => render_code(code),
    }
}

/// Prose handed to the rich-text surface.
fn editable_prose(tag: &str, content: Option<&str>) -> RenderElement {
    filtered_markup(tag, content.unwrap_or_default(), FILTERED_HTML)
        .class("prose")
        .attr("contenteditable", "true")
        .attr("data-field", "content")
        .weight(1)
        .build()
}

fn render_image(image: &ImageData) -> RenderElement {
    let mut grid = container("div")
        .class("image-grid")
        .attr("data-columns", &image.columns.max(1).to_string());
    for (i, item) in image.items.iter().enumerate() {
        let mut figure = container("figure");
        if !item.url.is_empty() {
            figure = figure.child(
                "image",
                void("img").attr("src", &item.url).attr("alt", &item.caption).weight(0).build(),
            );
        }
        figure = figure.child(
            "caption",
            markup("figcaption", &item.caption)
                .attr("data-field", &format!("items[{i}].caption"))
                .weight(1)
                .build(),
        );
        grid = grid.item(figure.build());
    }
    grid.build()
}

fn render_video(video: &VideoData) -> RenderElement {
    let mut figure = container("figure").class("video");
    if !video.url.is_empty() {
        figure = figure.child(
            "player",
            container("video").attr("src", &video.url).attr("controls", "controls").weight(0).build(),
        );
    }
    figure
        .child(
            "caption",
            markup("figcaption", &video.caption).attr("data-field", "caption").weight(1).build(),
        )
        .build()
}

fn render_audio(audio: &AudioData) -> RenderElement {
    let mut figure = container("figure").class("audio").child(
        "title",
        markup("figcaption", &audio.title).attr("data-field", "title").weight(0).build(),
    );
    if !audio.url.is_empty() {
        figure = figure.child(
            "player",
            container("audio").attr("src", &audio.url).attr("controls", "controls").weight(1).build(),
        );
    }
    figure.build()
}

fn render_file(file: &FileData) -> RenderElement {
    let label: &str = if file.name.is_empty() { "Download" } else { &file.name };
    let wrapper = container("div").class("file").attr("data-mime-type", &file.mime_type);
    let child = if file.url.is_empty() {
        ("name", markup("span", label).build())
    } else {
        ("link", link(&file.url, label).build())
    };
    wrapper.child(child.0, child.1).build()
}

fn render_quiz(quiz: &QuizData) -> RenderElement {
    let mut questions = container("ol").class("quiz__questions");
    for (qi, q) in quiz.questions.iter().enumerate() {
        let mut options = container("ol").class("quiz__options");
        for (oi, option) in q.options.iter().enumerate() {
            let mut li = markup("li", option).attr("data-field", &format!("questions[{qi}].options[{oi}]"));
            if oi == q.correct_answer {
                li = li.attr("data-correct", "true");
            }
            options = options.item(li.build());
        }
        let mut item = container("li")
            .attr("data-question-id", &q.id)
            .child("question", markup("p", &q.question).weight(0).build())
            .child("options", options.weight(1).build());
        if !q.explanation.is_empty() {
            item = item.child(
                "explanation",
                markup("p", &q.explanation)
                    .class("quiz__explanation")
                    .attr("data-field", &format!("questions[{qi}].explanation"))
                    .weight(2)
                    .build(),
            );
        }
        questions = questions.item(item.build());
    }
    container("div")
        .class("quiz")
        .child("title", markup("h3", &quiz.title).attr("data-field", "title").weight(0).build())
        .child("questions", questions.weight(1).build())
        .build()
}

fn render_deck(deck: &FlashcardDeckData) -> RenderElement {
    let mut cards = container("div").class("flashcards__cards");
    for card in &deck.cards {
        cards = cards.item(
            container("div")
                .class("flashcard")
                .attr("data-card-id", &card.id)
                .child("front", markup("div", &card.front).weight(0).build())
                .child("back", markup("div", &card.back).weight(1).build())
                .build(),
        );
    }
    container("div")
        .class("flashcards")
        .child("title", markup("h3", &deck.title).attr("data-field", "title").weight(0).build())
        .child("cards", cards.weight(1).build())
        .build()
}

fn render_callout(callout: &CalloutData) -> RenderElement {
    container("aside")
        .class("callout")
        .class(&format!("callout--{}", callout.tone.as_str()))
        .child("title", markup("strong", &callout.title).attr("data-field", "title").weight(0).build())
        .child("text", markup("p", &callout.text).attr("data-field", "text").weight(1).build())
        .build()
}

fn render_quote(quote: &QuoteData) -> RenderElement {
    let mut b = container("blockquote").child(
        "text",
        markup("p", &quote.text).attr("data-field", "text").weight(0).build(),
    );
    if !quote.author.is_empty() {
        b = b.child("author", markup("cite", &quote.author).weight(1).build());
    }
    b.build()
}

fn render_table(table: &TableData) -> RenderElement {
    let mut head_row = container("tr");
    for (c, header) in table.headers.iter().enumerate() {
        head_row = head_row.item(markup("th", header).attr("data-field", &format!("headers[{c}]")).build());
    }
    let mut body = container("tbody");
    for r in 0..table.rows.len() {
        let mut row = container("tr");
        for c in 0..table.headers.len() {
            row = row.item(
                markup("td", table.cell(r, c))
                    .attr("data-field", &format!("rows[{r}][{c}]"))
                    .build(),
            );
        }
        body = body.item(row.build());
    }
    container("table")
        .class("is-editable")
        .child("head", container("thead").child("row", head_row.build()).weight(0).build())
        .child("body", body.weight(1).build())
        .build()
}

fn render_list(list: &ListData) -> RenderElement {
    let tag = match list.style {
        ListStyle::Ordered => "ol",
        ListStyle::Unordered => "ul",
    };
    let mut b = container(tag);
    for (i, item) in list.items.iter().enumerate() {
        b = b.item(markup("li", item).attr("data-field", &format!("items[{i}]")).build());
    }
    b.build()
}

fn render_steps(steps: &StepsData) -> RenderElement {
    let mut b = container("ol").class("steps");
    for step in &steps.steps {
        b = b.item(
            container("li")
                .child("title", markup("h4", &step.title).weight(0).build())
                .child("description", markup("p", &step.description).weight(1).build())
                .build(),
        );
    }
    b.build()
}

/// Code is shown unhighlighted while editing.
fn render_code(code: &CodeData) -> RenderElement {
    container("pre")
        .class("code")
        .attr("data-language", code.language.trim())
        .child(
            "code",
            filtered_markup("code", &html_escape(&code.code), FULL_HTML)
                .attr("data-field", "code")
                .build(),
        )
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::content::rich_text::ContentTarget;
    use crate::content::split;
    use crate::render::preview::PreviewRenderer;
    use lectern_sdk::render::CONTROL;

    fn registry() -> BlockKindRegistry {
        BlockKindRegistry::with_standard_kinds()
    }

    fn count_actions(el: &RenderElement, action: &str) -> usize {
        let mut n = 0;
        el.walk(&mut |e| {
            if e.element_type == CONTROL && e.attr("data-action") == Some(action) {
                n += 1;
            }
        });
        n
    }

    #[test]
    fn block_controls_present() {
        let mut doc = Document::new();
        doc.insert(BlockKind::Text, None);
        doc.insert(BlockKind::Quiz, None);
        let session = EditorSession::new();
        let registry = registry();
        let tree = EditableRenderer::new(&session, &registry).render(&doc);
        assert_eq!(count_actions(&tree, "remove"), 2);
        assert_eq!(count_actions(&tree, "open-editor"), 1);
        assert_eq!(count_actions(&tree, "insert"), BlockKind::ALL.len());
    }

    #[test]
    fn boundary_move_buttons_are_disabled() {
        let mut doc = Document::new();
        doc.insert(BlockKind::Divider, None);
        let session = EditorSession::new();
        let registry = registry();
        let tree = EditableRenderer::new(&session, &registry).render(&doc);
        let block = &tree.children["item_0000"];
        assert_eq!(block.children["move_up"].attr("disabled"), Some("disabled"));
        assert_eq!(block.children["move_down"].attr("disabled"), Some("disabled"));
    }

    #[test]
    fn prose_is_marked_editable() {
        let mut doc = Document::new();
        doc.insert(BlockKind::Text, None);
        let session = EditorSession::new();
        let registry = registry();
        let tree = EditableRenderer::new(&session, &registry).render(&doc);
        let body = &tree.children["item_0000"].children["body"];
        assert_eq!(body.attr("contenteditable"), Some("true"));
    }

    #[test]
    fn picker_lists_only_slot_kinds() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Split, None);
        let mut session = EditorSession::new();
        session.open_slot_picker(id.clone(), Slot::Left);
        let registry = registry();
        let tree = EditableRenderer::new(&session, &registry).render(&doc);

        let mut offered = Vec::new();
        tree.walk(&mut |e| {
            if e.attr("data-action") == Some("populate-slot") {
                offered.push(e.attr("data-kind").unwrap_or_default().to_string());
            }
        });
        assert_eq!(offered.len(), split::SLOT_KINDS.len());
        assert!(!offered.iter().any(|k| k == "split"));
        assert_eq!(count_actions(&tree, "open-slot-picker"), 1);
    }

    #[test]
    fn open_editor_renders_panel_with_field_inputs() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Table, None);
        let mut session = EditorSession::new();
        session.open_editor(ContentTarget::Block { id: id.clone() }, BlockKind::Table);
        let registry = registry();
        let tree = EditableRenderer::new(&session, &registry).render(&doc);

        let panel = &tree.children["item_0000"].children["editor"];
        assert_eq!(panel.attr("data-editor"), Some("table"));
        let mut names = Vec::new();
        panel.walk(&mut |e| {
            if let Some(name) = e.attr("name") {
                names.push(name.to_string());
            }
        });
        assert!(names.contains(&"headers[0]".to_string()));
        assert!(names.contains(&"rows[1][1]".to_string()));
        assert_eq!(count_actions(panel, "add-column"), 1);
    }

    #[test]
    fn editor_panel_does_not_affect_parity() {
        let mut doc = Document::new();
        let id = doc.insert(BlockKind::Quiz, None);
        let mut session = EditorSession::new();
        session.focus(id.clone());
        session.open_editor(ContentTarget::Block { id }, BlockKind::Quiz);
        let registry = registry();
        let editable = EditableRenderer::new(&session, &registry).render(&doc);
        let preview = PreviewRenderer::default().render(&doc);
        assert_eq!(editable.skeleton(), preview.skeleton());
    }
}
