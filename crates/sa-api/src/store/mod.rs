//! Persistence behind a single handle.
//!
//! Postgres is used whenever `DATABASE_URL` is set; otherwise everything
//! lives in process memory. Every call is scoped by owner, so a record
//! owned by someone else looks exactly like a missing one.

mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use sa_db::{
    models::Summary,
    repositories::{deck as deck_repo, quiz as quiz_repo, summary as summary_repo},
};
use sa_engine::{FlashcardDeck, Quiz, QuizAttempt};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone, Debug)]
pub enum Store {
    Postgres(PgPool),
    Memory(Arc<MemoryStore>),
}

pub(crate) fn deck_not_found() -> ApiError {
    ApiError::NotFound("Deck not found".to_string())
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(Arc::new(MemoryStore::default()))
    }

    pub async fn insert_deck(&self, deck: &FlashcardDeck) -> Result<(), ApiError> {
        match self {
            Self::Postgres(pool) => deck_repo::insert_deck(pool, deck).await?,
            Self::Memory(mem) => mem.insert_deck(deck.clone()).await,
        }
        Ok(())
    }

    pub async fn find_deck(
        &self,
        owner_id: Uuid,
        deck_id: Uuid,
    ) -> Result<Option<FlashcardDeck>, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => deck_repo::find_deck(pool, owner_id, deck_id).await?,
            Self::Memory(mem) => mem.find_deck(owner_id, deck_id).await,
        })
    }

    /// Newest first.
    pub async fn list_decks(&self, owner_id: Uuid) -> Result<Vec<FlashcardDeck>, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => deck_repo::list_decks(pool, owner_id).await?,
            Self::Memory(mem) => mem.list_decks(owner_id).await,
        })
    }

    /// Load a deck, apply `f`, and write the result back as one unit.
    ///
    /// If `f` fails nothing is written and its error is returned. No other
    /// mutation of the same deck can interleave: Postgres holds a row lock
    /// for the duration of the transaction, the memory store its write lock.
    pub async fn update_deck<R, F>(
        &self,
        owner_id: Uuid,
        deck_id: Uuid,
        f: F,
    ) -> Result<R, ApiError>
    where
        F: FnOnce(&mut FlashcardDeck) -> Result<R, ApiError>,
    {
        match self {
            Self::Postgres(pool) => {
                let mut tx = pool.begin().await?;

                let mut deck = deck_repo::find_deck_for_update(&mut *tx, owner_id, deck_id)
                    .await?
                    .ok_or_else(deck_not_found)?;

                // Dropping the transaction on error rolls it back
                let out = f(&mut deck)?;

                if !deck_repo::update_deck(&mut *tx, &deck).await? {
                    return Err(deck_not_found());
                }
                tx.commit().await?;

                Ok(out)
            }
            Self::Memory(mem) => mem.update_deck(owner_id, deck_id, f).await,
        }
    }

    pub async fn delete_deck(&self, owner_id: Uuid, deck_id: Uuid) -> Result<bool, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => deck_repo::delete_deck(pool, owner_id, deck_id).await?,
            Self::Memory(mem) => mem.delete_deck(owner_id, deck_id).await,
        })
    }

    pub async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), ApiError> {
        match self {
            Self::Postgres(pool) => quiz_repo::insert_quiz(pool, quiz).await?,
            Self::Memory(mem) => mem.insert_quiz(quiz.clone()).await,
        }
        Ok(())
    }

    pub async fn find_quiz(&self, owner_id: Uuid, quiz_id: Uuid) -> Result<Option<Quiz>, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => quiz_repo::find_quiz(pool, owner_id, quiz_id).await?,
            Self::Memory(mem) => mem.find_quiz(owner_id, quiz_id).await,
        })
    }

    /// Newest first, with the source text left out.
    pub async fn list_quizzes(&self, owner_id: Uuid) -> Result<Vec<Quiz>, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => quiz_repo::list_quizzes(pool, owner_id).await?,
            Self::Memory(mem) => mem.list_quizzes(owner_id).await,
        })
    }

    /// Append one attempt. Returns `false` if the quiz is gone.
    pub async fn append_attempt(
        &self,
        owner_id: Uuid,
        quiz_id: Uuid,
        attempt: &QuizAttempt,
    ) -> Result<bool, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => {
                quiz_repo::append_attempt(pool, owner_id, quiz_id, attempt).await?
            }
            Self::Memory(mem) => mem.append_attempt(owner_id, quiz_id, attempt.clone()).await,
        })
    }

    pub async fn delete_quiz(&self, owner_id: Uuid, quiz_id: Uuid) -> Result<bool, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => quiz_repo::delete_quiz(pool, owner_id, quiz_id).await?,
            Self::Memory(mem) => mem.delete_quiz(owner_id, quiz_id).await,
        })
    }

    pub async fn insert_summary(&self, summary: &Summary) -> Result<(), ApiError> {
        match self {
            Self::Postgres(pool) => summary_repo::insert_summary(pool, summary).await?,
            Self::Memory(mem) => mem.insert_summary(summary.clone()).await,
        }
        Ok(())
    }

    pub async fn find_summary(
        &self,
        owner_id: Uuid,
        summary_id: Uuid,
    ) -> Result<Option<Summary>, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => summary_repo::find_summary(pool, owner_id, summary_id).await?,
            Self::Memory(mem) => mem.find_summary(owner_id, summary_id).await,
        })
    }

    /// The most recent summaries, newest first.
    pub async fn list_recent_summaries(&self, owner_id: Uuid) -> Result<Vec<Summary>, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => summary_repo::list_recent_summaries(pool, owner_id).await?,
            Self::Memory(mem) => mem.list_recent_summaries(owner_id).await,
        })
    }

    pub async fn delete_summary(&self, owner_id: Uuid, summary_id: Uuid) -> Result<bool, ApiError> {
        Ok(match self {
            Self::Postgres(pool) => summary_repo::delete_summary(pool, owner_id, summary_id).await?,
            Self::Memory(mem) => mem.delete_summary(owner_id, summary_id).await,
        })
    }
}
