use sa_engine::{Card, FlashcardDeck, NewCard, StudySession};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    ApiState,
    error::ApiError,
    metrics,
    store::deck_not_found,
    validation::{validate_difficulty, validate_source_text},
};

/// Title of a deck created from generated cards when the service gives none
pub const GENERATED_DECK_TITLE: &str = "Generated Flashcards";
pub const GENERATED_DECK_DESCRIPTION: &str = "Auto-generated from text";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDeckRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters long"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 tags are allowed"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub difficulty: i64,
}

#[derive(Debug, Deserialize)]
pub struct StudySessionRequest {
    pub cards_studied: u32,
    /// Seconds
    pub duration: u64,
}

const fn default_card_count() -> u32 {
    10
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateFlashcardsRequest {
    pub text: String,
    #[serde(default = "default_card_count")]
    #[validate(range(min = 1, max = 50, message = "Count must be between 1 and 50"))]
    pub count: u32,
    /// Append to this deck instead of creating a new one
    #[serde(default)]
    pub deck_id: Option<Uuid>,
}

pub async fn create_deck(
    state: &ApiState,
    owner_id: Uuid,
    req: CreateDeckRequest,
) -> Result<FlashcardDeck, ApiError> {
    req.validate()?;

    let deck = FlashcardDeck::new(
        owner_id,
        &req.title,
        req.description,
        req.tags,
        state.clock.now(),
    )?;
    state.store.insert_deck(&deck).await?;

    tracing::info!(deck_id = %deck.id, %owner_id, "deck created");
    Ok(deck)
}

pub async fn list_decks(state: &ApiState, owner_id: Uuid) -> Result<Vec<FlashcardDeck>, ApiError> {
    state.store.list_decks(owner_id).await
}

pub async fn get_deck(
    state: &ApiState,
    owner_id: Uuid,
    deck_id: Uuid,
) -> Result<FlashcardDeck, ApiError> {
    state
        .store
        .find_deck(owner_id, deck_id)
        .await?
        .ok_or_else(deck_not_found)
}

/// Delete a deck and its cards. A missing or foreign deck is `NotFound`.
pub async fn delete_deck(state: &ApiState, owner_id: Uuid, deck_id: Uuid) -> Result<(), ApiError> {
    if !state.store.delete_deck(owner_id, deck_id).await? {
        return Err(deck_not_found());
    }

    tracing::info!(%deck_id, %owner_id, "deck deleted");
    Ok(())
}

pub async fn add_card(
    state: &ApiState,
    owner_id: Uuid,
    deck_id: Uuid,
    content: NewCard,
) -> Result<Card, ApiError> {
    let now = state.clock.now();
    state
        .store
        .update_deck(owner_id, deck_id, |deck| Ok(deck.add_card(content, now)?.clone()))
        .await
}

pub async fn remove_card(
    state: &ApiState,
    owner_id: Uuid,
    deck_id: Uuid,
    card_id: Uuid,
) -> Result<Card, ApiError> {
    state
        .store
        .update_deck(owner_id, deck_id, |deck| Ok(deck.remove_card(card_id)?))
        .await
}

/// Rate one card and reschedule it.
pub async fn review_card(
    state: &ApiState,
    owner_id: Uuid,
    deck_id: Uuid,
    card_id: Uuid,
    req: ReviewRequest,
) -> Result<Card, ApiError> {
    let difficulty = validate_difficulty(req.difficulty)?;
    let now = state.clock.now();

    let card = state
        .store
        .update_deck(owner_id, deck_id, |deck| {
            Ok(deck.review_card(card_id, difficulty, now)?.clone())
        })
        .await?;

    metrics::record_card_review();
    Ok(card)
}

pub async fn due_cards(
    state: &ApiState,
    owner_id: Uuid,
    deck_id: Uuid,
) -> Result<Vec<Card>, ApiError> {
    let deck = get_deck(state, owner_id, deck_id).await?;
    let now = state.clock.now();
    Ok(deck.due_cards(now).cloned().collect())
}

pub async fn record_study_session(
    state: &ApiState,
    owner_id: Uuid,
    deck_id: Uuid,
    req: StudySessionRequest,
) -> Result<StudySession, ApiError> {
    let now = state.clock.now();
    state
        .store
        .update_deck(owner_id, deck_id, |deck| {
            Ok(deck
                .record_study_session(req.cards_studied, req.duration, now)
                .clone())
        })
        .await
}

/// Generate cards from text and add them to a deck.
///
/// With `deck_id` the cards are appended to that deck, all or none;
/// otherwise a new deck is created around them. Returns the resulting
/// deck and how many cards were added.
pub async fn generate_flashcards(
    state: &ApiState,
    owner_id: Uuid,
    req: GenerateFlashcardsRequest,
) -> Result<(FlashcardDeck, usize), ApiError> {
    req.validate()?;
    validate_source_text(&req.text)?;

    let draft = state.gateway.generate_flashcards(&req.text, req.count).await;
    let now = state.clock.now();

    let (deck, added) = match req.deck_id {
        Some(deck_id) => {
            state
                .store
                .update_deck(owner_id, deck_id, |deck| {
                    let added = deck.add_generated_cards(draft.cards, now)?;
                    Ok((deck.clone(), added))
                })
                .await?
        }
        None => {
            let title = match draft.title.trim() {
                "" => GENERATED_DECK_TITLE,
                title => title,
            };
            let mut deck = FlashcardDeck::new(
                owner_id,
                title,
                Some(GENERATED_DECK_DESCRIPTION.to_string()),
                Vec::new(),
                now,
            )?;
            let added = deck.add_generated_cards(draft.cards, now)?;
            state.store.insert_deck(&deck).await?;
            (deck, added)
        }
    };

    tracing::info!(deck_id = %deck.id, added, "generated flashcards added");
    Ok((deck, added))
}
