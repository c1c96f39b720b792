//! Flashcard decks: CRUD, reviews, study log, and generated cards.

pub mod routes;
pub mod service;

pub use routes::routes;
