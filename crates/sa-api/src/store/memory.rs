use sa_db::{models::Summary, repositories::summary::HISTORY_LIMIT};
use sa_engine::{FlashcardDeck, Quiz, QuizAttempt};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::deck_not_found;
use crate::error::ApiError;

/// In-process store used for tests and for running without a database.
///
/// Records are kept in insertion order; listings sort newest first with
/// later inserts winning ties.
#[derive(Debug, Default)]
pub struct MemoryStore {
    decks: RwLock<Vec<FlashcardDeck>>,
    quizzes: RwLock<Vec<Quiz>>,
    summaries: RwLock<Vec<Summary>>,
}

impl MemoryStore {
    pub(super) async fn insert_deck(&self, deck: FlashcardDeck) {
        self.decks.write().await.push(deck);
    }

    pub(super) async fn find_deck(&self, owner_id: Uuid, deck_id: Uuid) -> Option<FlashcardDeck> {
        self.decks
            .read()
            .await
            .iter()
            .find(|d| d.id == deck_id && d.owner_id == owner_id)
            .cloned()
    }

    pub(super) async fn list_decks(&self, owner_id: Uuid) -> Vec<FlashcardDeck> {
        let mut decks: Vec<_> = self
            .decks
            .read()
            .await
            .iter()
            .rev()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        decks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        decks
    }

    pub(super) async fn update_deck<R, F>(
        &self,
        owner_id: Uuid,
        deck_id: Uuid,
        f: F,
    ) -> Result<R, ApiError>
    where
        F: FnOnce(&mut FlashcardDeck) -> Result<R, ApiError>,
    {
        let mut decks = self.decks.write().await;
        let slot = decks
            .iter_mut()
            .find(|d| d.id == deck_id && d.owner_id == owner_id)
            .ok_or_else(deck_not_found)?;

        // Work on a copy so a failed mutation leaves the stored deck as it was
        let mut deck = slot.clone();
        let out = f(&mut deck)?;
        *slot = deck;
        Ok(out)
    }

    pub(super) async fn delete_deck(&self, owner_id: Uuid, deck_id: Uuid) -> bool {
        let mut decks = self.decks.write().await;
        let before = decks.len();
        decks.retain(|d| !(d.id == deck_id && d.owner_id == owner_id));
        decks.len() != before
    }

    pub(super) async fn insert_quiz(&self, quiz: Quiz) {
        self.quizzes.write().await.push(quiz);
    }

    pub(super) async fn find_quiz(&self, owner_id: Uuid, quiz_id: Uuid) -> Option<Quiz> {
        self.quizzes
            .read()
            .await
            .iter()
            .find(|q| q.id == quiz_id && q.owner_id == owner_id)
            .cloned()
    }

    pub(super) async fn list_quizzes(&self, owner_id: Uuid) -> Vec<Quiz> {
        let mut quizzes: Vec<_> = self
            .quizzes
            .read()
            .await
            .iter()
            .rev()
            .filter(|q| q.owner_id == owner_id)
            .map(|q| Quiz {
                source_text: String::new(),
                ..q.clone()
            })
            .collect();
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        quizzes
    }

    pub(super) async fn append_attempt(
        &self,
        owner_id: Uuid,
        quiz_id: Uuid,
        attempt: QuizAttempt,
    ) -> bool {
        let mut quizzes = self.quizzes.write().await;
        match quizzes
            .iter_mut()
            .find(|q| q.id == quiz_id && q.owner_id == owner_id)
        {
            Some(quiz) => {
                quiz.attempts.push(attempt);
                true
            }
            None => false,
        }
    }

    pub(super) async fn delete_quiz(&self, owner_id: Uuid, quiz_id: Uuid) -> bool {
        let mut quizzes = self.quizzes.write().await;
        let before = quizzes.len();
        quizzes.retain(|q| !(q.id == quiz_id && q.owner_id == owner_id));
        quizzes.len() != before
    }

    pub(super) async fn insert_summary(&self, summary: Summary) {
        self.summaries.write().await.push(summary);
    }

    pub(super) async fn find_summary(&self, owner_id: Uuid, summary_id: Uuid) -> Option<Summary> {
        self.summaries
            .read()
            .await
            .iter()
            .find(|s| s.id == summary_id && s.owner_id == owner_id)
            .cloned()
    }

    pub(super) async fn list_recent_summaries(&self, owner_id: Uuid) -> Vec<Summary> {
        let mut summaries: Vec<_> = self
            .summaries
            .read()
            .await
            .iter()
            .rev()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries.truncate(usize::try_from(HISTORY_LIMIT).unwrap_or(usize::MAX));
        summaries
    }

    pub(super) async fn delete_summary(&self, owner_id: Uuid, summary_id: Uuid) -> bool {
        let mut summaries = self.summaries.write().await;
        let before = summaries.len();
        summaries.retain(|s| !(s.id == summary_id && s.owner_id == owner_id));
        summaries.len() != before
    }
}
