//! Rich-text surface capability.
//!
//! The editing surface itself lives outside the core. The core only hands it
//! an HTML string, asks for the HTML back after each edit, and drives a fixed
//! set of named formatting commands. It never parses the HTML.

use std::fmt;
use std::str::FromStr;

use lectern_sdk::types::BlockId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::document::Document;
use super::split::{self, Slot};
use crate::error::EditorResult;

/// Formatting commands a surface must support, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RichTextCommand {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Subscript,
    Superscript,
    AlignLeft,
    AlignCenter,
    AlignRight,
    AlignJustify,
    OrderedList,
    UnorderedList,
    Paragraph,
    #[serde(rename = "heading-1")]
    Heading1,
    #[serde(rename = "heading-2")]
    Heading2,
    #[serde(rename = "heading-3")]
    Heading3,
    Blockquote,
    InsertLink,
    InsertImage,
    RemoveFormat,
    Undo,
    Redo,
}

impl RichTextCommand {
    /// Toolbar order.
    pub const ALL: [RichTextCommand; 22] = [
        RichTextCommand::Undo,
        RichTextCommand::Redo,
        RichTextCommand::Paragraph,
        RichTextCommand::Heading1,
        RichTextCommand::Heading2,
        RichTextCommand::Heading3,
        RichTextCommand::Blockquote,
        RichTextCommand::Bold,
        RichTextCommand::Italic,
        RichTextCommand::Underline,
        RichTextCommand::Strikethrough,
        RichTextCommand::Subscript,
        RichTextCommand::Superscript,
        RichTextCommand::AlignLeft,
        RichTextCommand::AlignCenter,
        RichTextCommand::AlignRight,
        RichTextCommand::AlignJustify,
        RichTextCommand::OrderedList,
        RichTextCommand::UnorderedList,
        RichTextCommand::InsertLink,
        RichTextCommand::InsertImage,
        RichTextCommand::RemoveFormat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RichTextCommand::Bold => "bold",
            RichTextCommand::Italic => "italic",
            RichTextCommand::Underline => "underline",
            RichTextCommand::Strikethrough => "strikethrough",
            RichTextCommand::Subscript => "subscript",
            RichTextCommand::Superscript => "superscript",
            RichTextCommand::AlignLeft => "align-left",
            RichTextCommand::AlignCenter => "align-center",
            RichTextCommand::AlignRight => "align-right",
            RichTextCommand::AlignJustify => "align-justify",
            RichTextCommand::OrderedList => "ordered-list",
            RichTextCommand::UnorderedList => "unordered-list",
            RichTextCommand::Paragraph => "paragraph",
            RichTextCommand::Heading1 => "heading-1",
            RichTextCommand::Heading2 => "heading-2",
            RichTextCommand::Heading3 => "heading-3",
            RichTextCommand::Blockquote => "blockquote",
            RichTextCommand::InsertLink => "insert-link",
            RichTextCommand::InsertImage => "insert-image",
            RichTextCommand::RemoveFormat => "remove-format",
            RichTextCommand::Undo => "undo",
            RichTextCommand::Redo => "redo",
        }
    }

    /// Toolbar label.
    pub fn label(self) -> &'static str {
        match self {
            RichTextCommand::Bold => "Bold",
            RichTextCommand::Italic => "Italic",
            RichTextCommand::Underline => "Underline",
            RichTextCommand::Strikethrough => "Strikethrough",
            RichTextCommand::Subscript => "Subscript",
            RichTextCommand::Superscript => "Superscript",
            RichTextCommand::AlignLeft => "Align left",
            RichTextCommand::AlignCenter => "Align center",
            RichTextCommand::AlignRight => "Align right",
            RichTextCommand::AlignJustify => "Justify",
            RichTextCommand::OrderedList => "Numbered list",
            RichTextCommand::UnorderedList => "Bulleted list",
            RichTextCommand::Paragraph => "Paragraph",
            RichTextCommand::Heading1 => "Heading 1",
            RichTextCommand::Heading2 => "Heading 2",
            RichTextCommand::Heading3 => "Heading 3",
            RichTextCommand::Blockquote => "Quote",
            RichTextCommand::InsertLink => "Link",
            RichTextCommand::InsertImage => "Image",
            RichTextCommand::RemoveFormat => "Clear formatting",
            RichTextCommand::Undo => "Undo",
            RichTextCommand::Redo => "Redo",
        }
    }

    /// Commands that take an argument (a URL).
    pub fn takes_argument(self) -> bool {
        matches!(self, RichTextCommand::InsertLink | RichTextCommand::InsertImage)
    }
}

impl fmt::Display for RichTextCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RichTextCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RichTextCommand::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown rich-text command '{s}'"))
    }
}

/// An external rich-text editing surface.
pub trait RichTextSurface {
    /// Show `html` for editing, replacing whatever was loaded.
    fn load(&mut self, html: &str);

    /// The current HTML.
    fn html(&self) -> String;

    /// Run a command at the caret. Returns whether the surface applied it.
    fn exec(&mut self, command: RichTextCommand, argument: Option<&str>) -> bool;

    /// Whether `command` is active at the caret (e.g. bold text selected).
    fn is_active(&self, command: RichTextCommand) -> bool;
}

/// Where a surface's HTML is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "lowercase")]
pub enum ContentTarget {
    Block { id: BlockId },
    Slot { id: BlockId, slot: Slot },
}

impl ContentTarget {
    pub fn block_id(&self) -> &BlockId {
        match self {
            ContentTarget::Block { id } | ContentTarget::Slot { id, .. } => id,
        }
    }

    /// The current HTML at this target, if the target exists.
    pub fn read<'a>(&self, doc: &'a Document) -> Option<&'a str> {
        match self {
            ContentTarget::Block { id } => doc.get(id)?.content.as_deref(),
            ContentTarget::Slot { id, slot } => split::slot(doc, id, *slot)?.content.as_deref(),
        }
    }

    /// Write `html` to this target. Stale targets are ignored.
    pub fn write(&self, doc: &mut Document, html: String) -> EditorResult<()> {
        match self {
            ContentTarget::Block { id } => {
                doc.update_content(id, html);
                Ok(())
            }
            ContentTarget::Slot { id, slot } => split::update_slot_content(doc, id, *slot, html),
        }
    }
}

/// A surface bound to one block or slot.
pub struct RichTextBinding<S> {
    surface: S,
    target: ContentTarget,
}

impl<S: RichTextSurface> RichTextBinding<S> {
    /// Load the target's current HTML into `surface`.
    pub fn attach(mut surface: S, doc: &Document, target: ContentTarget) -> Self {
        surface.load(target.read(doc).unwrap_or_default());
        Self { surface, target }
    }

    pub fn target(&self) -> &ContentTarget {
        &self.target
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for user edits; call [`Self::commit`] afterwards.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Push the surface's HTML into the document.
    pub fn commit(&self, doc: &mut Document) -> EditorResult<()> {
        self.target.write(doc, self.surface.html())
    }

    /// Run a command and commit the resulting HTML.
    pub fn exec(
        &mut self,
        doc: &mut Document,
        command: RichTextCommand,
        argument: Option<&str>,
    ) -> EditorResult<bool> {
        if command.takes_argument() && argument.is_none_or(str::is_empty) {
            debug!(%command, "rich-text command needs a URL, ignoring");
            return Ok(false);
        }
        let applied = self.surface.exec(command, argument);
        if applied {
            self.commit(doc)?;
        }
        Ok(applied)
    }

    pub fn detach(self) -> S {
        self.surface
    }
}
