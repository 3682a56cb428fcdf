//! Lectern Kernel Library
//!
//! The lesson authoring core: block document model, split slots,
//! sub-editors, templates, file ingestion and the two renderers.
//! The `lectern` binary is a thin command-line front end over it.

pub mod config;
pub mod content;
pub mod error;
pub mod file;
pub mod render;
pub mod session;
