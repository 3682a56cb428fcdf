//! Quiz editor.
//!
//! Exactly one option per question is correct at a time: marking an option
//! overwrites `correct_answer` rather than toggling a flag.

use lectern_sdk::types::{Question, QuizData, generate_entry_id};
use tracing::debug;

use super::SubEditor;

/// Number of blank options a new question starts with.
pub const NEW_QUESTION_OPTIONS: usize = 4;

#[derive(Debug, Clone)]
pub struct QuizEditor {
    data: QuizData,
}

impl SubEditor for QuizEditor {
    type Data = QuizData;

    /// A stored mark that points past the last option is reset to the first.
    fn open(initial: QuizData) -> Self {
        let mut data = initial;
        for q in &mut data.questions {
            if q.correct_answer > 0 && q.correct_answer >= q.options.len() {
                debug!(
                    question = %q.id,
                    correct_answer = q.correct_answer,
                    "quiz: mark out of range, resetting"
                );
                q.correct_answer = 0;
            }
        }
        Self { data }
    }

    fn data(&self) -> &QuizData {
        &self.data
    }
}

impl QuizEditor {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.data.title = title.into();
    }

    /// Append a blank question and return its index.
    pub fn add_question(&mut self) -> usize {
        self.data.questions.push(Question {
            id: generate_entry_id(),
            question: String::new(),
            options: vec![String::new(); NEW_QUESTION_OPTIONS],
            correct_answer: 0,
            explanation: String::new(),
        });
        self.data.questions.len() - 1
    }

    pub fn remove_question(&mut self, index: usize) -> bool {
        if index >= self.data.questions.len() {
            return false;
        }
        self.data.questions.remove(index);
        true
    }

    pub fn set_question_text(&mut self, index: usize, text: impl Into<String>) {
        if let Some(q) = self.data.questions.get_mut(index) {
            q.question = text.into();
        }
    }

    pub fn set_explanation(&mut self, index: usize, text: impl Into<String>) {
        if let Some(q) = self.data.questions.get_mut(index) {
            q.explanation = text.into();
        }
    }

    pub fn set_option(&mut self, question: usize, option: usize, text: impl Into<String>) {
        if let Some(slot) = self
            .data
            .questions
            .get_mut(question)
            .and_then(|q| q.options.get_mut(option))
        {
            *slot = text.into();
        }
    }

    /// Mark `option` as the single correct answer of `question`.
    pub fn mark_correct(&mut self, question: usize, option: usize) -> bool {
        match self.data.questions.get_mut(question) {
            Some(q) if option < q.options.len() => {
                q.correct_answer = option;
                true
            }
            _ => false,
        }
    }

    /// Append a blank option to `question` and return its index.
    pub fn add_option(&mut self, question: usize) -> Option<usize> {
        let q = self.data.questions.get_mut(question)?;
        q.options.push(String::new());
        Some(q.options.len() - 1)
    }

    /// Remove one option. The last remaining option cannot be removed.
    ///
    /// If the correct option survives it stays marked (its index shifts down
    /// when an earlier option goes). If the correct option itself is removed
    /// the first option becomes correct.
    pub fn remove_option(&mut self, question: usize, option: usize) -> bool {
        let Some(q) = self.data.questions.get_mut(question) else {
            return false;
        };
        if option >= q.options.len() || q.options.len() == 1 {
            return false;
        }
        q.options.remove(option);
        q.correct_answer = match q.correct_answer {
            c if c == option => 0,
            c if c > option => c - 1,
            c => c,
        };
        true
    }
}
