//! Lesson content module.
//!
//! This module provides:
//! - Document: the ordered block list and its mutation operations
//! - factory: default payloads for every block kind
//! - BlockKindRegistry: kind metadata, shape validation and sanitizing
//! - split: the two-slot split-block controller
//! - editors: structured sub-editors for quiz, flashcards, table, steps and list
//! - rich_text: the rich-text command set and surface binding
//! - TemplateCatalog: named block sequences for new lessons

pub mod block_types;
pub mod document;
pub mod editors;
pub mod factory;
pub mod rich_text;
pub mod split;
pub mod template;

pub use block_types::{BlockKindDefinition, BlockKindRegistry, sanitize_html};
pub use document::{Direction, Document};
pub use rich_text::{ContentTarget, RichTextBinding, RichTextCommand, RichTextSurface};
pub use split::Slot;
pub use template::{Template, TemplateCatalog, TemplateSummary};
