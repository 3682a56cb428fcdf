//! Lectern SDK
//!
//! Types shared between the authoring kernel, persistence collaborators and
//! renderers: the lesson block model with its JSON wire format, and the
//! render element tree both renderers produce.

pub mod render;
pub mod types;

pub mod prelude {
    pub use crate::render;
    pub use crate::render::{ElementBuilder, RenderElement, Skeleton};
    pub use crate::types::*;
}
