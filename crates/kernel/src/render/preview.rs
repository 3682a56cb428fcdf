//! Read-only renderer.
//!
//! Side-effect free: takes the document by shared reference and never emits
//! controls. Prose passes through ammonia at serialization time; code
//! blocks are highlighted with `syntect`, falling back to escaped text for
//! unknown languages.

use std::sync::LazyLock;

use lectern_sdk::render::{
    ElementBuilder, RenderElement, container, filtered_markup, link, markup, void,
};
use lectern_sdk::types::{
    AudioData, Block, BlockData, CalloutData, CodeData, FileData, FlashcardDeckData, ImageData,
    LeafData, ListData, ListStyle, QuizData, QuoteData, SplitData, StepsData, SubBlock, TableData,
    VideoData,
};
use tracing::debug;

use super::filter::{FILTERED_HTML, FULL_HTML, html_escape};
use crate::config::DEFAULT_CODE_THEME;
use crate::content::document::Document;

// Pre-loaded syntect resources (avoid reloading per call).
static SYNTAX_SET: LazyLock<syntect::parsing::SyntaxSet> =
    LazyLock::new(syntect::parsing::SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<syntect::highlighting::ThemeSet> =
    LazyLock::new(syntect::highlighting::ThemeSet::load_defaults);

/// Renders a document for readers.
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    code_theme: String,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_THEME)
    }
}

impl PreviewRenderer {
    pub fn new(code_theme: impl Into<String>) -> Self {
        Self {
            code_theme: code_theme.into(),
        }
    }

    /// Render the whole document.
    pub fn render(&self, doc: &Document) -> RenderElement {
        doc.iter()
            .fold(container("article").class("lesson"), |lesson, block| {
                lesson.item(self.render_block(block))
            })
            .build()
    }

    /// Render one top-level block inside its wrapper.
    pub fn render_block(&self, block: &Block) -> RenderElement {
        let body = match &block.data {
            BlockData::Leaf(leaf) => self.render_leaf(leaf, block.content.as_deref()),
            BlockData::Split(split) => self.render_split(split),
        };
        container("section")
            .class("block")
            .attr("data-kind", block.kind().as_str())
            .attr("data-block-id", block.id.as_str())
            .child("body", body)
            .build()
    }

    fn render_split(&self, split: &SplitData) -> RenderElement {
        let mut b = container("div").class("split");
        if let Some(sub) = &split.left {
            b = b.child("left", self.render_slot(sub).weight(0).build());
        }
        if let Some(sub) = &split.right {
            b = b.child("right", self.render_slot(sub).weight(1).build());
        }
        b.build()
    }

    fn render_slot(&self, sub: &SubBlock) -> ElementBuilder {
        container("div")
            .class("split__slot")
            .attr("data-kind", sub.kind().as_str())
            .child("body", self.render_leaf(&sub.data, sub.content.as_deref()))
    }

    fn render_leaf(&self, leaf: &LeafData, content: Option<&str>) -> RenderElement {
        match leaf {
            LeafData::Text => prose("div", content),
            LeafData::Accordion(accordion) => container("details")
                .class("accordion")
                .child("summary", markup("summary", &accordion.title).weight(0).build())
                .child("content", prose("div", content))
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
            LeafData::Code(code) => self.render_code(code),
        }
    }

    /// Highlighted code, or escaped plain text when the language is unknown.
    fn render_code(&self, code: &CodeData) -> RenderElement {
        let html = self
            .highlight(&code.code, code.language.trim())
            .unwrap_or_else(|| html_escape(&code.code));
        container("pre")
            .class("code")
            .attr("data-language", code.language.trim())
            .child("code", filtered_markup("code", &html, FULL_HTML).build())
            .build()
    }

    fn highlight(&self, code: &str, lang: &str) -> Option<String> {
        if lang.is_empty() {
            return None;
        }
        let ss = &*SYNTAX_SET;
        let ts = &*THEME_SET;
        let syntax = ss
            .find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_name(lang))?;
        let theme = ts
            .themes
            .get(&self.code_theme)
            .or_else(|| ts.themes.get(DEFAULT_CODE_THEME))
            .or_else(|| ts.themes.values().next())?;
        match syntect::html::highlighted_html_for_string(code, ss, syntax, theme) {
            Ok(highlighted) => Some(highlighted),
            Err(e) => {
                debug!(language = lang, error = %e, "highlighting failed, using plain text");
                None
            }
        }
    }
}

/// Author prose, sanitized when serialized. Missing content renders empty.
fn prose(tag: &str, content: Option<&str>) -> RenderElement {
    filtered_markup(tag, content.unwrap_or_default(), FILTERED_HTML)
        .class("prose")
        .weight(1)
        .build()
}

fn render_image(image: &ImageData) -> RenderElement {
    let columns = image.columns.max(1).to_string();
    image
        .items
        .iter()
        .fold(
            container("div").class("image-grid").attr("data-columns", &columns),
            |grid, item| {
                let mut figure = container("figure");
                if !item.url.is_empty() {
                    figure = figure.child(
                        "image",
                        void("img")
                            .attr("src", &item.url)
                            .attr("alt", &item.caption)
                            .weight(0)
                            .build(),
                    );
                }
                grid.item(
                    figure
                        .child("caption", markup("figcaption", &item.caption).weight(1).build())
                        .build(),
                )
            },
        )
        .build()
}

fn render_video(video: &VideoData) -> RenderElement {
    let mut figure = container("figure").class("video");
    if !video.url.is_empty() {
        figure = figure.child(
            "player",
            container("video")
                .attr("src", &video.url)
                .attr("controls", "controls")
                .weight(0)
                .build(),
        );
    }
    figure
        .child("caption", markup("figcaption", &video.caption).weight(1).build())
        .build()
}

fn render_audio(audio: &AudioData) -> RenderElement {
    let mut figure = container("figure")
        .class("audio")
        .child("title", markup("figcaption", &audio.title).weight(0).build());
    if !audio.url.is_empty() {
        figure = figure.child(
            "player",
            container("audio")
                .attr("src", &audio.url)
                .attr("controls", "controls")
                .weight(1)
                .build(),
        );
    }
    figure.build()
}

fn file_label(file: &FileData) -> &str {
    if file.name.is_empty() {
        "Download"
    } else {
        &file.name
    }
}

fn render_file(file: &FileData) -> RenderElement {
    let wrapper = container("div").class("file");
    if file.url.is_empty() {
        wrapper
            .child("name", markup("span", file_label(file)).build())
            .build()
    } else {
        wrapper
            .child(
                "link",
                link(&file.url, file_label(file))
                    .attr("download", file_label(file))
                    .build(),
            )
            .build()
    }
}

fn render_quiz(quiz: &QuizData) -> RenderElement {
    let questions = quiz
        .questions
        .iter()
        .fold(container("ol").class("quiz__questions"), |list, q| {
            let options = q.options.iter().enumerate().fold(
                container("ol").class("quiz__options"),
                |opts, (i, option)| {
                    let mut li = markup("li", option);
                    if i == q.correct_answer {
                        li = li.attr("data-correct", "true");
                    }
                    opts.item(li.build())
                },
            );
            let mut item = container("li")
                .attr("data-question-id", &q.id)
                .child("question", markup("p", &q.question).weight(0).build())
                .child("options", options.weight(1).build());
            if !q.explanation.is_empty() {
                item = item.child(
                    "explanation",
                    markup("p", &q.explanation).class("quiz__explanation").weight(2).build(),
                );
            }
            list.item(item.build())
        });
    container("div")
        .class("quiz")
        .child("title", markup("h3", &quiz.title).weight(0).build())
        .child("questions", questions.weight(1).build())
        .build()
}

fn render_deck(deck: &FlashcardDeckData) -> RenderElement {
    let cards = deck
        .cards
        .iter()
        .fold(container("div").class("flashcards__cards"), |cards, card| {
            cards.item(
                container("div")
                    .class("flashcard")
                    .child("front", markup("div", &card.front).weight(0).build())
                    .child("back", markup("div", &card.back).weight(1).build())
                    .build(),
            )
        });
    container("div")
        .class("flashcards")
        .child("title", markup("h3", &deck.title).weight(0).build())
        .child("cards", cards.weight(1).build())
        .build()
}

fn render_callout(callout: &CalloutData) -> RenderElement {
    container("aside")
        .class("callout")
        .class(&format!("callout--{}", callout.tone.as_str()))
        .child("title", markup("strong", &callout.title).weight(0).build())
        .child("text", markup("p", &callout.text).weight(1).build())
        .build()
}

fn render_quote(quote: &QuoteData) -> RenderElement {
    let mut b = container("blockquote").child("text", markup("p", &quote.text).weight(0).build());
    if !quote.author.is_empty() {
        b = b.child("author", markup("cite", &quote.author).weight(1).build());
    }
    b.build()
}

/// Ragged rows are drawn at header width: missing cells render empty.
fn render_table(table: &TableData) -> RenderElement {
    let head_row = table
        .headers
        .iter()
        .fold(container("tr"), |row, h| row.item(markup("th", h).build()));
    let body = table
        .rows
        .iter()
        .enumerate()
        .fold(container("tbody"), |body, (r, _)| {
            let row = (0..table.headers.len()).fold(container("tr"), |row, c| {
                row.item(markup("td", table.cell(r, c)).build())
            });
            body.item(row.build())
        });
    container("table")
        .child(
            "head",
            container("thead").child("row", head_row.build()).weight(0).build(),
        )
        .child("body", body.weight(1).build())
        .build()
}

fn render_list(list: &ListData) -> RenderElement {
    let tag = match list.style {
        ListStyle::Ordered => "ol",
        ListStyle::Unordered => "ul",
    };
    list.items
        .iter()
        .fold(container(tag), |l, item| l.item(markup("li", item).build()))
        .build()
}

fn render_steps(steps: &StepsData) -> RenderElement {
    steps
        .steps
        .iter()
        .fold(container("ol").class("steps"), |list, step| {
            list.item(
                container("li")
                    .child("title", markup("h4", &step.title).weight(0).build())
                    .child("description", markup("p", &step.description).weight(1).build())
                    .build(),
            )
        })
        .build()
}
