//! Lesson renderers.
//!
//! Both renderers produce a [`RenderElement`] tree rather than HTML. The
//! read-only tree is what learners see; the editable tree carries the same
//! display elements plus authoring controls, so the two can be compared
//! with [`same_structure`].

pub mod editable;
pub mod filter;
pub mod html;
pub mod preview;

use lectern_sdk::render::RenderElement;

pub use editable::EditableRenderer;
pub use filter::{FilterPipeline, TextFilter, TextFormat};
pub use html::to_html;
pub use preview::PreviewRenderer;

/// Whether two trees show the same display structure once authoring
/// controls are removed.
pub fn same_structure(a: &RenderElement, b: &RenderElement) -> bool {
    a.skeleton() == b.skeleton()
}
