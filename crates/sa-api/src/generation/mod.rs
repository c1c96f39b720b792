//! Client for the external AI generation service.
//!
//! Each generation call has a `try_*` form that surfaces [`GatewayError`]
//! and a plain form that never fails: on any upstream problem it logs a
//! warning and returns a fixed placeholder payload.

mod client;
mod fallback;

pub use client::{
    FlashcardsDraft, GatewayError, GenerationGateway, QuizDraft, QuizRequest, SummaryDraft,
};
