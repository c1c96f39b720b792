//! The flashcard deck aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    card::{Card, NewCard},
    error::EngineError,
    scheduler::Difficulty,
};

/// One entry of a deck's study log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub date: DateTime<Utc>,
    pub cards_studied: u32,
    /// Seconds spent studying
    pub duration: u64,
}

/// An owned, titled collection of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardDeck {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Creation order; removals never reorder the remaining cards
    pub cards: Vec<Card>,
    /// Append-only
    pub study_sessions: Vec<StudySession>,
    pub created_at: DateTime<Utc>,
    pub last_studied: Option<DateTime<Utc>>,
}

impl FlashcardDeck {
    /// Create an empty deck. The title is trimmed and must not be blank.
    pub fn new(
        owner_id: Uuid,
        title: &str,
        description: Option<String>,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::validation("Please provide a title"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            description: description.unwrap_or_default(),
            tags: tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            cards: Vec::new(),
            study_sessions: Vec::new(),
            created_at: now,
            last_studied: None,
        })
    }

    pub fn card(&self, card_id: Uuid) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    /// Append a new card, due immediately.
    pub fn add_card(&mut self, content: NewCard, now: DateTime<Utc>) -> Result<&Card, EngineError> {
        let card = Card::new(content, now)?;
        self.cards.push(card);
        Ok(&self.cards[self.cards.len() - 1])
    }

    /// Append a batch of cards in the order given.
    ///
    /// Every card is validated before any is appended, so a bad entry
    /// leaves the deck unchanged. Returns the number of cards added.
    pub fn add_generated_cards(
        &mut self,
        cards: Vec<NewCard>,
        now: DateTime<Utc>,
    ) -> Result<usize, EngineError> {
        let cards = cards
            .into_iter()
            .map(|content| Card::new(content, now))
            .collect::<Result<Vec<_>, _>>()?;

        let added = cards.len();
        self.cards.extend(cards);
        Ok(added)
    }

    /// Review a single card. Other cards are left untouched.
    pub fn review_card(
        &mut self,
        card_id: Uuid,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> Result<&Card, EngineError> {
        let card = self
            .cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or_else(|| EngineError::not_found("Card not found"))?;

        card.apply_review(difficulty, now)?;

        tracing::debug!(
            deck_id = %self.id,
            card_id = %card.id,
            review_count = card.review_count,
            next_review = %card.next_review,
            "card reviewed"
        );

        Ok(card)
    }

    /// Remove a card, keeping the order of the others.
    pub fn remove_card(&mut self, card_id: Uuid) -> Result<Card, EngineError> {
        let index = self
            .cards
            .iter()
            .position(|c| c.id == card_id)
            .ok_or_else(|| EngineError::not_found("Card not found"))?;
        Ok(self.cards.remove(index))
    }

    /// Cards due at `now`, in deck order.
    pub fn due_cards(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.is_due(now))
    }

    pub fn record_study_session(
        &mut self,
        cards_studied: u32,
        duration: u64,
        now: DateTime<Utc>,
    ) -> &StudySession {
        self.study_sessions.push(StudySession {
            date: now,
            cards_studied,
            duration,
        });
        self.last_studied = Some(now);
        &self.study_sessions[self.study_sessions.len() - 1]
    }
}
