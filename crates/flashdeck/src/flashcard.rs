//! Core flashcard types.
//!
//! A [`Flashcard`] is a question/answer pair tagged with a deck identifier.
//! [`NewFlashcard`] and [`FlashcardUpdate`] are the inputs accepted by the
//! store's add and update paths; both double as the JSON request bodies.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A stored flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    /// Unique identifier assigned by the store.
    pub id: i64,
    /// The deck this card belongs to.
    pub deck_id: String,
    /// Front of the card.
    pub question: String,
    /// Back of the card.
    pub answer: String,
}

impl Flashcard {
    /// Build the record that an update writes back.
    ///
    /// `id` and `deck_id` are taken from `self`; only the question and answer
    /// come from the update.
    #[must_use]
    pub fn with_content(self, update: &FlashcardUpdate) -> Self {
        Self {
            id: self.id,
            deck_id: self.deck_id,
            question: update.question.clone(),
            answer: update.answer.clone(),
        }
    }
}

/// A flashcard that has not been stored yet.
///
/// Any `id` present in a JSON body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFlashcard {
    /// The deck this card belongs to.
    pub deck_id: String,
    /// Front of the card.
    pub question: String,
    /// Back of the card.
    pub answer: String,
}

impl NewFlashcard {
    /// Create a new, unvalidated flashcard.
    #[must_use]
    pub fn new(
        deck_id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            deck_id: deck_id.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Check that every field is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        require("deckId", &self.deck_id)?;
        require("question", &self.question)?;
        require("answer", &self.answer)
    }
}

/// New content for an existing flashcard.
///
/// Deliberately has no deck field: a `deckId` sent by the caller is dropped
/// during deserialization, so an update can never move a card between decks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardUpdate {
    /// Replacement question.
    pub question: String,
    /// Replacement answer.
    pub answer: String,
}

impl FlashcardUpdate {
    /// Create a new, unvalidated update.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Check that both fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        require("question", &self.question)?;
        require("answer", &self.answer)
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field));
    }
    Ok(())
}
