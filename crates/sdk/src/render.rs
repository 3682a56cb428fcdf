//! Render element builder API.
//!
//! Renderers return structured render elements (never raw HTML). The kernel
//! serializes these to HTML, applying the text format named on each markup
//! element. Keeping the intermediate tree lets callers compare the output of
//! two renderers structurally.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Element type of interactive affordances that only the editable view emits.
pub const CONTROL: &str = "control";

/// Classes with this prefix mark transient editing state (`is-focused`,
/// `is-active`) and are left out of the skeleton.
pub const STATE_CLASS_PREFIX: &str = "is-";

/// A render element in the JSON render tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderElement {
    #[serde(rename = "#type")]
    pub element_type: String,
    #[serde(rename = "#weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    #[serde(rename = "#tag", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "#value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "#format", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "#attributes", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(flatten)]
    pub children: BTreeMap<String, RenderElement>,
}

impl RenderElement {
    pub fn set_child(&mut self, key: &str, element: RenderElement) {
        self.children.insert(key.into(), element);
    }

    /// String attribute lookup.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .as_ref()
            .and_then(|a| a.get(key))
            .and_then(|v| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .as_ref()
            .and_then(|a| a.get("class"))
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|c| c.as_str())
    }

    /// Children sorted by weight, then key.
    pub fn ordered_children(&self) -> Vec<(&str, &RenderElement)> {
        let mut children: Vec<_> = self
            .children
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        children.sort_by(|a, b| {
            a.1.weight
                .unwrap_or(0)
                .cmp(&b.1.weight.unwrap_or(0))
                .then_with(|| a.0.cmp(b.0))
        });
        children
    }

    /// Depth-first visit of this element and every descendant.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a RenderElement)) {
        visit(self);
        for (_, child) in self.ordered_children() {
            child.walk(visit);
        }
    }

    /// Whether any element in the tree has the given type.
    pub fn contains_type(&self, element_type: &str) -> bool {
        let mut found = false;
        self.walk(&mut |el| found |= el.element_type == element_type);
        found
    }

    /// Structural outline: element types, tags, display classes and child
    /// keys, with control elements removed.
    pub fn skeleton(&self) -> Skeleton {
        let mut classes: Vec<String> = self
            .classes()
            .filter(|c| !c.starts_with(STATE_CLASS_PREFIX))
            .map(String::from)
            .collect();
        classes.sort();
        Skeleton {
            element_type: self.element_type.clone(),
            tag: self.tag.clone(),
            classes,
            children: self
                .ordered_children()
                .into_iter()
                .filter(|(_, c)| c.element_type != CONTROL)
                .map(|(k, c)| (k.to_string(), c.skeleton()))
                .collect(),
        }
    }
}

/// Value-free outline of a render tree, used to compare renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    pub element_type: String,
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub children: Vec<(String, Skeleton)>,
}

/// Builder for constructing render elements.
pub struct ElementBuilder {
    element_type: String,
    weight: Option<i32>,
    tag: Option<String>,
    value: Option<String>,
    format: Option<String>,
    classes: Vec<String>,
    attrs: serde_json::Map<String, Value>,
    children: BTreeMap<String, RenderElement>,
    next_item: i32,
}

impl ElementBuilder {
    fn new(element_type: &str) -> Self {
        Self {
            element_type: element_type.into(),
            weight: None,
            tag: None,
            value: None,
            format: None,
            classes: Vec::new(),
            attrs: serde_json::Map::new(),
            children: BTreeMap::new(),
            next_item: 0,
        }
    }

    pub fn weight(mut self, w: i32) -> Self {
        self.weight = Some(w);
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.into(), Value::String(value.into()));
        self
    }

    pub fn child(mut self, key: &str, element: RenderElement) -> Self {
        self.children.insert(key.into(), element);
        self
    }

    /// Append a positional child (`item_0000`, `item_0001`, ...) weighted by
    /// insertion order.
    pub fn item(mut self, mut element: RenderElement) -> Self {
        let n = self.next_item;
        self.next_item += 1;
        element.weight = Some(n);
        self.children.insert(format!("item_{n:04}"), element);
        self
    }

    pub fn build(self) -> RenderElement {
        let attributes = if self.classes.is_empty() && self.attrs.is_empty() {
            None
        } else {
            let mut map = self.attrs;
            if !self.classes.is_empty() {
                map.insert(
                    "class".into(),
                    Value::Array(self.classes.into_iter().map(Value::String).collect()),
                );
            }
            Some(Value::Object(map))
        };

        RenderElement {
            element_type: self.element_type,
            weight: self.weight,
            tag: self.tag,
            value: self.value,
            format: self.format,
            attributes,
            children: self.children,
        }
    }
}

/// Create a container element (groups children, wrapped in `tag`).
pub fn container(tag: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new("container");
    b.tag = Some(tag.into());
    b
}

/// Create a markup element with an HTML tag and plain text value.
pub fn markup(tag: &str, value: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new("markup");
    b.tag = Some(tag.into());
    b.value = Some(value.into());
    b.format = Some("plain_text".into());
    b
}

/// Create a markup element whose value is HTML in the given text format
/// (`filtered_html` for author prose, `full_html` for kernel-generated markup).
pub fn filtered_markup(tag: &str, value: &str, format: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new("markup");
    b.tag = Some(tag.into());
    b.value = Some(value.into());
    b.format = Some(format.into());
    b
}

/// Create a childless, valueless element such as `<img>` or `<hr>`.
pub fn void(tag: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new("void");
    b.tag = Some(tag.into());
    b
}

/// Create a link element.
pub fn link(href: &str, text: &str) -> ElementBuilder {
    let mut b = markup("a", text);
    b.attrs.insert("href".into(), Value::String(href.into()));
    b
}

/// Create an authoring control (button) that dispatches `action`.
pub fn control(action: &str, label: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new(CONTROL);
    b.tag = Some("button".into());
    b.value = Some(label.into());
    b.format = Some("plain_text".into());
    b.attrs
        .insert("data-action".into(), Value::String(action.into()));
    b
}

/// Create a group of authoring controls (toolbar, editor panel). The whole
/// subtree is dropped from [`RenderElement::skeleton`].
pub fn control_group(tag: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new(CONTROL);
    b.tag = Some(tag.into());
    b
}

/// Create a form input bound to `field`.
pub fn input(field: &str, value: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new(CONTROL);
    b.tag = Some("input".into());
    b.attrs.insert("name".into(), Value::String(field.into()));
    b.attrs.insert("value".into(), Value::String(value.into()));
    b
}
