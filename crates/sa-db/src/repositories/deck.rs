use sa_engine::FlashcardDeck;
use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::models::DeckRow;

pub async fn insert_deck<'e, E>(executor: E, deck: &FlashcardDeck) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO flashcard_decks (id, owner_id, title, description, tags, cards, study_sessions, created_at, last_studied)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(deck.id)
    .bind(deck.owner_id)
    .bind(&deck.title)
    .bind(&deck.description)
    .bind(&deck.tags)
    .bind(Json(&deck.cards))
    .bind(Json(&deck.study_sessions))
    .bind(deck.created_at)
    .bind(deck.last_studied)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_deck<'e, E>(
    executor: E,
    owner_id: Uuid,
    deck_id: Uuid,
) -> Result<Option<FlashcardDeck>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<DeckRow> = sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, owner_id, title, description, tags, cards, study_sessions, created_at, last_studied
            FROM flashcard_decks
            WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(deck_id)
    .bind(owner_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Into::into))
}

/// Like [`find_deck`] but locks the row until the surrounding transaction ends.
pub async fn find_deck_for_update<'e, E>(
    executor: E,
    owner_id: Uuid,
    deck_id: Uuid,
) -> Result<Option<FlashcardDeck>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<DeckRow> = sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, owner_id, title, description, tags, cards, study_sessions, created_at, last_studied
            FROM flashcard_decks
            WHERE id = $1 AND owner_id = $2
            FOR UPDATE
        "#,
    )
    .bind(deck_id)
    .bind(owner_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn list_decks<'e, E>(
    executor: E,
    owner_id: Uuid,
) -> Result<Vec<FlashcardDeck>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<DeckRow> = sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, owner_id, title, description, tags, cards, study_sessions, created_at, last_studied
            FROM flashcard_decks
            WHERE owner_id = $1
            ORDER BY created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Overwrite the mutable parts of a deck. Returns `false` if no row matched.
pub async fn update_deck<'e, E>(executor: E, deck: &FlashcardDeck) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE flashcard_decks
            SET title = $3,
                description = $4,
                tags = $5,
                cards = $6,
                study_sessions = $7,
                last_studied = $8,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(deck.id)
    .bind(deck.owner_id)
    .bind(&deck.title)
    .bind(&deck.description)
    .bind(&deck.tags)
    .bind(Json(&deck.cards))
    .bind(Json(&deck.study_sessions))
    .bind(deck.last_studied)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a deck and, with it, every embedded card.
pub async fn delete_deck<'e, E>(
    executor: E,
    owner_id: Uuid,
    deck_id: Uuid,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM flashcard_decks
            WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(deck_id)
    .bind(owner_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
