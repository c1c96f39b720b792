use sa_engine::{Quiz, QuizAttempt};
use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::models::QuizRow;

pub async fn insert_quiz<'e, E>(executor: E, quiz: &Quiz) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO quizzes (id, owner_id, title, description, source_text, difficulty, time_limit, questions, attempts, tags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(quiz.id)
    .bind(quiz.owner_id)
    .bind(&quiz.title)
    .bind(&quiz.description)
    .bind(&quiz.source_text)
    .bind(quiz.difficulty.as_str())
    .bind(i32::try_from(quiz.time_limit).unwrap_or(i32::MAX))
    .bind(Json(&quiz.questions))
    .bind(Json(&quiz.attempts))
    .bind(&quiz.tags)
    .bind(quiz.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_quiz<'e, E>(
    executor: E,
    owner_id: Uuid,
    quiz_id: Uuid,
) -> Result<Option<Quiz>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<QuizRow> = sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, owner_id, title, description, source_text, difficulty, time_limit, questions, attempts, tags, created_at
            FROM quizzes
            WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(quiz_id)
    .bind(owner_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Into::into))
}

/// All quizzes of a user, newest first. Source text is left out.
pub async fn list_quizzes<'e, E>(executor: E, owner_id: Uuid) -> Result<Vec<Quiz>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<QuizRow> = sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, owner_id, title, description, '' AS source_text, difficulty, time_limit, questions, attempts, tags, created_at
            FROM quizzes
            WHERE owner_id = $1
            ORDER BY created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Append one attempt without touching earlier ones.
///
/// Returns `false` if the quiz does not exist for this owner.
pub async fn append_attempt<'e, E>(
    executor: E,
    owner_id: Uuid,
    quiz_id: Uuid,
    attempt: &QuizAttempt,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE quizzes
            SET attempts = attempts || jsonb_build_array($3::jsonb)
            WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(quiz_id)
    .bind(owner_id)
    .bind(Json(attempt))
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a quiz together with its attempts.
pub async fn delete_quiz<'e, E>(
    executor: E,
    owner_id: Uuid,
    quiz_id: Uuid,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM quizzes
            WHERE id = $1 AND owner_id = $2
        "#,
    )
    .bind(quiz_id)
    .bind(owner_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
