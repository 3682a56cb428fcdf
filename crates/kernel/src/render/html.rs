//! Render tree serializer.
//!
//! Converts a `RenderElement` tree to an HTML string. Children are emitted in
//! weight order; every markup value passes through the filter pipeline named
//! by its `#format`.

use std::fmt::Write;

use lectern_sdk::render::{CONTROL, RenderElement};
use serde_json::Value;

use super::filter::{TextFormat, html_escape};

/// Elements that have no closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "source"];

/// Serialize a render tree to HTML.
pub fn to_html(element: &RenderElement) -> String {
    let mut html = String::new();
    render_element(element, &mut html);
    html
}

fn render_element(element: &RenderElement, out: &mut String) {
    match element.element_type.as_str() {
        "container" => {
            let tag = element.tag.as_deref().unwrap_or("div");
            open_tag(tag, element, out);
            render_children(element, out);
            close_tag(tag, out);
        }
        "markup" | CONTROL => {
            let default_tag = if element.element_type == CONTROL {
                "button"
            } else {
                "span"
            };
            let tag = element.tag.as_deref().unwrap_or(default_tag);
            open_tag(tag, element, out);
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            if let Some(value) = &element.value {
                out.push_str(&process_value(value, element.format.as_deref()));
            }
            render_children(element, out);
            close_tag(tag, out);
        }
        "void" => {
            let tag = element.tag.as_deref().unwrap_or("br");
            open_tag(tag, element, out);
        }
        other => {
            // Unknown type - wrap in a div
            let _ = write!(out, "<div class=\"element element--{}\">", html_escape(other));
            render_children(element, out);
            out.push_str("</div>");
        }
    }
}

fn render_children(element: &RenderElement, out: &mut String) {
    for (_, child) in element.ordered_children() {
        render_element(child, out);
    }
}

fn open_tag(tag: &str, element: &RenderElement, out: &mut String) {
    let _ = write!(out, "<{tag}");
    let class = class_string(element);
    if !class.is_empty() {
        let _ = write!(out, " class=\"{}\"", html_escape(&class));
    }
    out.push_str(&extra_attrs(element));
    out.push('>');
}

fn close_tag(tag: &str, out: &mut String) {
    let _ = write!(out, "</{tag}>");
}

fn process_value(value: &str, format: Option<&str>) -> String {
    format
        .map_or(TextFormat::PlainText, TextFormat::from_name)
        .apply(value)
}

/// Convert a classes value (array or string) to a space-separated string.
fn classes_to_string(classes: &Value) -> String {
    match classes {
        Value::Array(arr) => arr
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn class_string(element: &RenderElement) -> String {
    element
        .attributes
        .as_ref()
        .and_then(|attrs| attrs.get("class"))
        .map(classes_to_string)
        .unwrap_or_default()
}

/// Extra attributes (excluding class), sorted by name.
fn extra_attrs(element: &RenderElement) -> String {
    let Some(Value::Object(obj)) = &element.attributes else {
        return String::new();
    };

    let mut attrs: Vec<_> = obj.iter().filter(|(k, _)| *k != "class").collect();
    attrs.sort_by(|a, b| a.0.cmp(b.0));

    attrs
        .into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!(" {k}=\"{}\"", html_escape(s)),
            Value::Bool(true) => format!(" {k}"),
            Value::Bool(false) | Value::Null => String::new(),
            _ => format!(" {k}=\"{}\"", html_escape(&v.to_string())),
        })
        .collect()
}
