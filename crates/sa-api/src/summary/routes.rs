use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use sa_db::models::Summary;
use uuid::Uuid;

use super::service::{self, CreateSummaryRequest};
use crate::{ApiState, auth::AuthUser, error::ApiError};

/// Create the summary routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/summarize", post(create_summary))
        .route("/summarize/history", get(list_summaries))
        .route(
            "/summarize/{summary_id}",
            get(get_summary).delete(delete_summary),
        )
}

async fn create_summary(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(req): Json<CreateSummaryRequest>,
) -> Result<(StatusCode, Json<Summary>), ApiError> {
    let summary = service::create_summary(&state, auth_user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn list_summaries(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Summary>>, ApiError> {
    Ok(Json(service::list_summaries(&state, auth_user.user_id).await?))
}

async fn get_summary(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(summary_id): Path<Uuid>,
) -> Result<Json<Summary>, ApiError> {
    Ok(Json(
        service::get_summary(&state, auth_user.user_id, summary_id).await?,
    ))
}

async fn delete_summary(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(summary_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service::delete_summary(&state, auth_user.user_id, summary_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
