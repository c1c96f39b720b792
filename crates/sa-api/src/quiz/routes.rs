use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use sa_engine::{Navigation, Quiz, QuizScore, QuizSession, SessionResult};
use uuid::Uuid;

use super::service::{self, AnswerRequest, GenerateQuizRequest, SubmitAnswersRequest};
use crate::{ApiState, auth::AuthUser, error::ApiError};

/// Create the quiz routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/quiz/generate", post(generate_quiz))
        .route("/quiz/list", get(list_quizzes))
        .route("/quiz/{quiz_id}", get(get_quiz).delete(delete_quiz))
        .route("/quiz/{quiz_id}/submit", post(submit_answers))
        .route("/quiz/{quiz_id}/sessions", post(start_session))
        .route(
            "/quiz/sessions/{session_id}",
            get(get_session).delete(abandon_session),
        )
        .route(
            "/quiz/sessions/{session_id}/answers/{index}",
            put(answer_question),
        )
        .route("/quiz/sessions/{session_id}/navigate", post(navigate))
        .route("/quiz/sessions/{session_id}/submit", post(submit_session))
}

async fn generate_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<(StatusCode, Json<Quiz>), ApiError> {
    let quiz = service::generate_quiz(&state, auth_user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

async fn list_quizzes(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Quiz>>, ApiError> {
    Ok(Json(service::list_quizzes(&state, auth_user.user_id).await?))
}

async fn get_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Quiz>, ApiError> {
    Ok(Json(service::get_quiz(&state, auth_user.user_id, quiz_id).await?))
}

async fn delete_quiz(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service::delete_quiz(&state, auth_user.user_id, quiz_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_answers(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<Json<QuizScore>, ApiError> {
    let score = service::submit_answers(&state, auth_user.user_id, quiz_id, req).await?;
    Ok(Json(score))
}

async fn start_session(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<(StatusCode, Json<QuizSession>), ApiError> {
    let session = service::start_session(&state, auth_user.user_id, quiz_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn get_session(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<QuizSession>, ApiError> {
    Ok(Json(
        service::get_session(&state, auth_user.user_id, session_id).await?,
    ))
}

async fn abandon_session(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service::abandon_session(&state, auth_user.user_id, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn answer_question(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path((session_id, index)): Path<(Uuid, usize)>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<QuizSession>, ApiError> {
    let session =
        service::answer_question(&state, auth_user.user_id, session_id, index, req).await?;
    Ok(Json(session))
}

async fn navigate(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(session_id): Path<Uuid>,
    Json(to): Json<Navigation>,
) -> Result<Json<QuizSession>, ApiError> {
    Ok(Json(
        service::navigate(&state, auth_user.user_id, session_id, to).await?,
    ))
}

async fn submit_session(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResult>, ApiError> {
    Ok(Json(
        service::submit_session(&state, auth_user.user_id, session_id).await?,
    ))
}
