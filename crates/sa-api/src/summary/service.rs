use sa_db::models::{Summary, SummaryLength, WordCount};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{ApiState, error::ApiError, validation::validate_source_text};

pub const UNTITLED_SUMMARY: &str = "Untitled Summary";

fn summary_not_found() -> ApiError {
    ApiError::NotFound("Summary not found".to_string())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSummaryRequest {
    pub text: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Title must be at most 200 characters long"))]
    pub title: Option<String>,
    #[serde(default)]
    pub length: SummaryLength,
}

pub async fn create_summary(
    state: &ApiState,
    owner_id: Uuid,
    req: CreateSummaryRequest,
) -> Result<Summary, ApiError> {
    req.validate()?;
    validate_source_text(&req.text)?;

    let draft = state.gateway.summarize(&req.text, req.length).await;

    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED_SUMMARY)
        .to_string();

    let summary = Summary {
        id: Uuid::new_v4(),
        owner_id,
        title,
        word_count: WordCount::of(&req.text, &draft.summary),
        original_text: req.text,
        summary: draft.summary,
        length: req.length,
        tags: draft.keywords,
        created_at: state.clock.now(),
    };
    state.store.insert_summary(&summary).await?;

    tracing::info!(
        summary_id = %summary.id,
        %owner_id,
        words = summary.word_count.original,
        "summary created"
    );
    Ok(summary)
}

/// The caller's most recent summaries, newest first.
pub async fn list_summaries(state: &ApiState, owner_id: Uuid) -> Result<Vec<Summary>, ApiError> {
    state.store.list_recent_summaries(owner_id).await
}

pub async fn get_summary(
    state: &ApiState,
    owner_id: Uuid,
    summary_id: Uuid,
) -> Result<Summary, ApiError> {
    state
        .store
        .find_summary(owner_id, summary_id)
        .await?
        .ok_or_else(summary_not_found)
}

pub async fn delete_summary(
    state: &ApiState,
    owner_id: Uuid,
    summary_id: Uuid,
) -> Result<(), ApiError> {
    if !state.store.delete_summary(owner_id, summary_id).await? {
        return Err(summary_not_found());
    }
    Ok(())
}
