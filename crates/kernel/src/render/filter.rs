//! Text formats for markup values.
//!
//! Every markup element names the format of its `#value`, and the HTML
//! serializer runs the value through that format's filter pipeline.
//! Unknown format names are treated as plain text.

use std::sync::LazyLock;

use crate::content::block_types::sanitize_html;

pub const PLAIN_TEXT: &str = "plain_text";
pub const FILTERED_HTML: &str = "filtered_html";
pub const FULL_HTML: &str = "full_html";

/// How a markup value is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Titles, captions, cells: escaped, newlines become `<br>`.
    PlainText,
    /// Author prose from the rich-text surface: sanitized.
    FilteredHtml,
    /// Markup the kernel generated itself (highlighted code).
    FullHtml,
}

static PLAIN_TEXT_PIPELINE: LazyLock<FilterPipeline> =
    LazyLock::new(|| FilterPipeline::new().add(EscapeFilter).add(LineBreakFilter));
static FILTERED_HTML_PIPELINE: LazyLock<FilterPipeline> =
    LazyLock::new(|| FilterPipeline::new().add(ProseFilter));
static FULL_HTML_PIPELINE: LazyLock<FilterPipeline> = LazyLock::new(FilterPipeline::new);

impl TextFormat {
    pub fn from_name(name: &str) -> Self {
        match name {
            FILTERED_HTML => TextFormat::FilteredHtml,
            FULL_HTML => TextFormat::FullHtml,
            _ => TextFormat::PlainText,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextFormat::PlainText => PLAIN_TEXT,
            TextFormat::FilteredHtml => FILTERED_HTML,
            TextFormat::FullHtml => FULL_HTML,
        }
    }

    pub fn pipeline(self) -> &'static FilterPipeline {
        match self {
            TextFormat::PlainText => &PLAIN_TEXT_PIPELINE,
            TextFormat::FilteredHtml => &FILTERED_HTML_PIPELINE,
            TextFormat::FullHtml => &FULL_HTML_PIPELINE,
        }
    }

    pub fn apply(self, value: &str) -> String {
        self.pipeline().process(value)
    }
}

/// One step of a format's pipeline.
pub trait TextFilter: Send + Sync {
    fn name(&self) -> &str;

    fn process(&self, input: &str) -> String;
}

/// Filters applied in order.
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn TextFilter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F: TextFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn process(&self, input: &str) -> String {
        self.filters
            .iter()
            .fold(input.to_string(), |acc, filter| filter.process(&acc))
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

struct EscapeFilter;

impl TextFilter for EscapeFilter {
    fn name(&self) -> &str {
        "escape"
    }

    fn process(&self, input: &str) -> String {
        html_escape(input)
    }
}

/// Multi-line plain text (card backs, step descriptions) keeps its breaks.
struct LineBreakFilter;

impl TextFilter for LineBreakFilter {
    fn name(&self) -> &str {
        "line_breaks"
    }

    fn process(&self, input: &str) -> String {
        input.replace("\r\n", "\n").replace('\n', "<br>\n")
    }
}

struct ProseFilter;

impl TextFilter for ProseFilter {
    fn name(&self) -> &str {
        "sanitize"
    }

    fn process(&self, input: &str) -> String {
        sanitize_html(input)
    }
}

/// Escape text for HTML content and attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_escapes_and_keeps_line_breaks() {
        let out = TextFormat::PlainText.apply("a < b\r\nc & d");
        assert_eq!(out, "a &lt; b<br>\nc &amp; d");
    }

    #[test]
    fn prose_is_sanitized_not_escaped() {
        let out = TextFormat::FilteredHtml.apply(r#"<p><em>ok</em></p><a href="javascript:x()" onclick="y()">go</a>"#);
        assert!(out.contains("<em>ok</em>"));
        assert!(!out.contains("javascript:"));
        assert!(!out.contains("onclick"));
    }

    #[test]
    fn full_html_passes_through() {
        let highlighted = "<span style=\"color:#333\">fn</span>";
        assert_eq!(TextFormat::FullHtml.apply(highlighted), highlighted);
    }

    #[test]
    fn unknown_format_is_plain_text() {
        assert_eq!(TextFormat::from_name("markdown"), TextFormat::PlainText);
        assert_eq!(TextFormat::from_name(FILTERED_HTML).as_str(), FILTERED_HTML);
        assert_eq!(
            TextFormat::PlainText.pipeline().filter_names(),
            vec!["escape", "line_breaks"]
        );
    }

    #[test]
    fn escape_covers_attribute_quotes() {
        assert_eq!(html_escape(r#"<"it's">&"#), "&lt;&quot;it&#x27;s&quot;&gt;&amp;");
    }
}
