use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use sa_engine::{Card, FlashcardDeck, NewCard, StudySession};
use serde_json::json;
use uuid::Uuid;

use super::service::{
    self, CreateDeckRequest, GenerateFlashcardsRequest, ReviewRequest, StudySessionRequest,
};
use crate::{ApiState, auth::AuthUser, error::ApiError};

/// Create the flashcard routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/flashcards/decks", post(create_deck).get(list_decks))
        .route("/flashcards/decks/{deck_id}", get(get_deck).delete(delete_deck))
        .route("/flashcards/decks/{deck_id}/cards", post(add_card))
        .route(
            "/flashcards/decks/{deck_id}/cards/{card_id}",
            delete(remove_card),
        )
        .route(
            "/flashcards/decks/{deck_id}/cards/{card_id}/review",
            put(review_card),
        )
        .route("/flashcards/decks/{deck_id}/due", get(due_cards))
        .route(
            "/flashcards/decks/{deck_id}/sessions",
            post(record_study_session),
        )
        .route("/flashcards/generate", post(generate_flashcards))
}

async fn create_deck(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(req): Json<CreateDeckRequest>,
) -> Result<(StatusCode, Json<FlashcardDeck>), ApiError> {
    let deck = service::create_deck(&state, auth_user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(deck)))
}

async fn list_decks(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<FlashcardDeck>>, ApiError> {
    Ok(Json(service::list_decks(&state, auth_user.user_id).await?))
}

async fn get_deck(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<FlashcardDeck>, ApiError> {
    Ok(Json(service::get_deck(&state, auth_user.user_id, deck_id).await?))
}

async fn delete_deck(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(deck_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service::delete_deck(&state, auth_user.user_id, deck_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_card(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(deck_id): Path<Uuid>,
    Json(content): Json<NewCard>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    let card = service::add_card(&state, auth_user.user_id, deck_id, content).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn remove_card(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path((deck_id, card_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    service::remove_card(&state, auth_user.user_id, deck_id, card_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn review_card(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path((deck_id, card_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<Card>, ApiError> {
    let card = service::review_card(&state, auth_user.user_id, deck_id, card_id, req).await?;
    Ok(Json(card))
}

async fn due_cards(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<Vec<Card>>, ApiError> {
    Ok(Json(service::due_cards(&state, auth_user.user_id, deck_id).await?))
}

async fn record_study_session(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(deck_id): Path<Uuid>,
    Json(req): Json<StudySessionRequest>,
) -> Result<(StatusCode, Json<StudySession>), ApiError> {
    let session = service::record_study_session(&state, auth_user.user_id, deck_id, req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn generate_flashcards(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Json(req): Json<GenerateFlashcardsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (deck, added) = service::generate_flashcards(&state, auth_user.user_id, req).await?;
    Ok(Json(json!({
        "message": format!("Added {added} cards to deck"),
        "added": added,
        "deck": deck,
    })))
}
