//! Flashcard deck editor.

use lectern_sdk::types::{Flashcard, FlashcardDeckData, generate_entry_id};

use super::SubEditor;

#[derive(Debug, Clone)]
pub struct FlashcardEditor {
    data: FlashcardDeckData,
}

impl SubEditor for FlashcardEditor {
    type Data = FlashcardDeckData;

    fn open(initial: FlashcardDeckData) -> Self {
        Self { data: initial }
    }

    fn data(&self) -> &FlashcardDeckData {
        &self.data
    }
}

impl FlashcardEditor {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.data.title = title.into();
    }

    /// Append a card with an empty front and back; returns its index.
    pub fn add_card(&mut self) -> usize {
        self.data.cards.push(Flashcard {
            id: generate_entry_id(),
            front: String::new(),
            back: String::new(),
        });
        self.data.cards.len() - 1
    }

    pub fn remove_card(&mut self, index: usize) -> bool {
        if index >= self.data.cards.len() {
            return false;
        }
        self.data.cards.remove(index);
        true
    }

    pub fn set_front(&mut self, index: usize, text: impl Into<String>) {
        if let Some(card) = self.data.cards.get_mut(index) {
            card.front = text.into();
        }
    }

    pub fn set_back(&mut self, index: usize, text: impl Into<String>) {
        if let Some(card) = self.data.cards.get_mut(index) {
            card.back = text.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cards_start_blank() {
        let mut deck = FlashcardEditor::open(FlashcardDeckData::default());
        let i = deck.add_card();
        let card = &deck.data().cards[i];
        assert!(card.front.is_empty() && card.back.is_empty());
        assert!(!card.id.is_empty());
    }

    #[test]
    fn edit_and_remove_cards() {
        let mut deck = FlashcardEditor::open(FlashcardDeckData::default());
        deck.add_card();
        deck.add_card();
        deck.set_front(1, "Q");
        deck.set_back(1, "A");
        deck.set_front(9, "ignored");
        assert!(deck.remove_card(0));
        assert!(!deck.remove_card(1));

        let cards = &deck.data().cards;
        assert_eq!(cards.len(), 1);
        assert_eq!((cards[0].front.as_str(), cards[0].back.as_str()), ("Q", "A"));
    }
}
