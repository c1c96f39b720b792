use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Summary, SummaryRow};

/// How many summaries the history view returns
pub const HISTORY_LIMIT: i64 = 20;

pub async fn insert_summary<'e, E>(executor: E, summary: &Summary) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO summaries (id, owner_id, title, original_text, summary, length, word_count_original, word_count_summary, tags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(summary.id)
    .bind(summary.owner_id)
    .bind(&summary.title)
    .bind(&summary.original_text)
    .bind(&summary.summary)
    .bind(summary.length.as_str())
    .bind(i32::try_from(summary.word_count.original).unwrap_or(i32::MAX))
    .bind(i32::try_from(summary.word_count.summary).unwrap_or(i32::MAX))
    .bind(&summary.tags)
    .bind(summary.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_summary<'e, E>(
    executor: E,
    owner_id: Uuid,
    summary_id: Uuid,
) -> Result<Option<Summary>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<SummaryRow> = sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, owner_id, title, original_text, summary, length, word_count_original, word_count_summary, tags, created_at
            FROM summaries
            WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(summary_id)
    .bind(owner_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Into::into))
}

/// Most recent summaries first, capped at [`HISTORY_LIMIT`].
pub async fn list_recent_summaries<'e, E>(
    executor: E,
    owner_id: Uuid,
) -> Result<Vec<Summary>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<SummaryRow> = sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, owner_id, title, original_text, summary, length, word_count_original, word_count_summary, tags, created_at
            FROM summaries
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2
        "#,
    )
    .bind(owner_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn delete_summary<'e, E>(
    executor: E,
    owner_id: Uuid,
    summary_id: Uuid,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM summaries
            WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(summary_id)
    .bind(owner_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
