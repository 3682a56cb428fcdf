//! List editor.

use lectern_sdk::types::{ListData, ListStyle};

use super::SubEditor;

#[derive(Debug, Clone)]
pub struct ListEditor {
    data: ListData,
}

impl SubEditor for ListEditor {
    type Data = ListData;

    fn open(initial: ListData) -> Self {
        Self { data: initial }
    }

    fn data(&self) -> &ListData {
        &self.data
    }
}

impl ListEditor {
    pub fn add_item(&mut self) -> usize {
        self.data.items.push(String::new());
        self.data.items.len() - 1
    }

    pub fn remove_item(&mut self, index: usize) -> bool {
        if index >= self.data.items.len() {
            return false;
        }
        self.data.items.remove(index);
        true
    }

    pub fn set_item(&mut self, index: usize, text: impl Into<String>) {
        if let Some(item) = self.data.items.get_mut(index) {
            *item = text.into();
        }
    }

    pub fn set_style(&mut self, style: ListStyle) {
        self.data.style = style;
    }

    /// Switch between ordered and unordered.
    pub fn toggle_style(&mut self) {
        self.data.style = match self.data.style {
            ListStyle::Ordered => ListStyle::Unordered,
            ListStyle::Unordered => ListStyle::Ordered,
        };
    }
}
