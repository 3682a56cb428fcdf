//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::file::MAX_FILE_SIZE;

/// Authoring core configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Extra template catalog directory, merged over the built-in catalog.
    pub templates_dir: Option<PathBuf>,

    /// Maximum size of a file turned into a data URI (default: 10 MB).
    pub max_upload_bytes: usize,

    /// syntect theme used by the read-only renderer for code blocks.
    pub code_theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: None,
            max_upload_bytes: MAX_FILE_SIZE,
            code_theme: DEFAULT_CODE_THEME.to_string(),
        }
    }
}

/// Theme shipped with syntect's default theme set.
pub const DEFAULT_CODE_THEME: &str = "InspiredGitHub";

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let templates_dir = env::var("LECTERN_TEMPLATES_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let max_upload_bytes = env::var("LECTERN_MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| MAX_FILE_SIZE.to_string())
            .parse()
            .context("LECTERN_MAX_UPLOAD_BYTES must be a valid byte count")?;

        let code_theme =
            env::var("LECTERN_CODE_THEME").unwrap_or_else(|_| DEFAULT_CODE_THEME.to_string());

        Ok(Self {
            templates_dir,
            max_upload_bytes,
            code_theme,
        })
    }
}
