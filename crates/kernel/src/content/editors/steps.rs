//! Steps editor.

use lectern_sdk::types::{Step, StepsData};

use super::SubEditor;

#[derive(Debug, Clone)]
pub struct StepsEditor {
    data: StepsData,
}

impl SubEditor for StepsEditor {
    type Data = StepsData;

    fn open(initial: StepsData) -> Self {
        Self { data: initial }
    }

    fn data(&self) -> &StepsData {
        &self.data
    }
}

impl StepsEditor {
    /// Append a step titled after its position; returns its index.
    pub fn add_step(&mut self) -> usize {
        let n = self.data.steps.len() + 1;
        self.data.steps.push(Step {
            title: format!("Step {n}"),
            description: String::new(),
        });
        n - 1
    }

    /// Remove the step at `index`; later steps shift down by one.
    pub fn remove_step(&mut self, index: usize) -> bool {
        if index >= self.data.steps.len() {
            return false;
        }
        self.data.steps.remove(index);
        true
    }

    pub fn set_title(&mut self, index: usize, title: impl Into<String>) {
        if let Some(step) = self.data.steps.get_mut(index) {
            step.title = title.into();
        }
    }

    pub fn set_description(&mut self, index: usize, description: impl Into<String>) {
        if let Some(step) = self.data.steps.get_mut(index) {
            step.description = description.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_and_remove_shifts() {
        let mut steps = StepsEditor::open(StepsData::default());
        steps.add_step();
        steps.add_step();
        steps.add_step();
        steps.set_description(2, "third");

        assert!(steps.remove_step(0));
        assert!(!steps.remove_step(2));
        let data = steps.data();
        assert_eq!(data.steps.len(), 2);
        assert_eq!(data.steps[1].description, "third");
        assert_eq!(data.steps[0].title, "Step 2");
    }

    #[test]
    fn edits_in_place() {
        let mut steps = StepsEditor::open(StepsData::default());
        let i = steps.add_step();
        steps.set_title(i, "Prepare");
        assert_eq!(steps.data().steps[0].title, "Prepare");
    }
}
