use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::EngineError,
    scheduler::{Difficulty, schedule_next_review},
};

/// A single front/back flashcard with its own review schedule.
///
/// `review_count == 0` exactly when `last_reviewed` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    pub difficulty: Difficulty,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review: DateTime<Utc>,
    pub review_count: u32,
}

/// Card content before it is placed in a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub front: String,
    pub back: String,
}

impl NewCard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    /// Both sides must be non-blank after trimming.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.front.trim().is_empty() || self.back.trim().is_empty() {
            return Err(EngineError::validation(
                "Please provide both front and back content",
            ));
        }
        Ok(())
    }
}

impl Card {
    /// Create an unreviewed card that is due immediately.
    pub fn new(content: NewCard, now: DateTime<Utc>) -> Result<Self, EngineError> {
        content.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            front: content.front,
            back: content.back,
            difficulty: Difficulty::default(),
            last_reviewed: None,
            next_review: now,
            review_count: 0,
        })
    }

    /// Record a review at `now` rated `difficulty`.
    ///
    /// Either every field is updated or, on error, none is.
    pub fn apply_review(
        &mut self,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let review_count = self
            .review_count
            .checked_add(1)
            .ok_or_else(|| EngineError::invalid_state("Review count overflow"))?;
        let next_review = schedule_next_review(review_count, difficulty, now)?;

        self.review_count = review_count;
        self.last_reviewed = Some(now);
        self.difficulty = difficulty;
        self.next_review = next_review;

        Ok(())
    }

    /// Whether the card should be shown at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}
