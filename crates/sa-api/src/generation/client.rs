use std::time::Duration;

use sa_db::models::SummaryLength;
use sa_engine::{NewCard, Question, QuestionType, QuizDifficulty};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use super::fallback;
use crate::metrics;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty response: {0}")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryDraft {
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlashcardsDraft {
    #[serde(default)]
    pub title: String,
    pub cards: Vec<NewCard>,
}

/// Parameters of a quiz generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizRequest {
    pub num_questions: u32,
    pub difficulty: QuizDifficulty,
    pub question_types: Vec<QuestionType>,
}

impl Default for QuizRequest {
    fn default() -> Self {
        Self {
            num_questions: 10,
            difficulty: QuizDifficulty::Medium,
            question_types: vec![QuestionType::MultipleChoice, QuestionType::TrueFalse],
        }
    }
}

#[derive(Serialize)]
struct SummarizeBody<'a> {
    text: &'a str,
    length: SummaryLength,
}

#[derive(Serialize)]
struct QuizBody<'a> {
    text: &'a str,
    #[serde(flatten)]
    request: &'a QuizRequest,
}

#[derive(Serialize)]
struct FlashcardsBody<'a> {
    text: &'a str,
    count: u32,
}

#[derive(Debug, Clone)]
pub struct GenerationGateway {
    base_url: String,
    client: reqwest::Client,
}

impl GenerationGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub async fn try_summarize(
        &self,
        text: &str,
        length: SummaryLength,
    ) -> Result<SummaryDraft, GatewayError> {
        self.post("/api/summarize", &SummarizeBody { text, length })
            .await
    }

    pub async fn try_generate_quiz(
        &self,
        text: &str,
        request: &QuizRequest,
    ) -> Result<QuizDraft, GatewayError> {
        let draft: QuizDraft = self
            .post("/api/quiz/generate", &QuizBody { text, request })
            .await?;
        if draft.questions.is_empty() {
            return Err(GatewayError::Empty("quiz has no questions"));
        }
        if draft
            .questions
            .iter()
            .any(|q| q.question.trim().is_empty() || q.correct_answer.trim().is_empty())
        {
            return Err(GatewayError::Empty("blank quiz question"));
        }
        Ok(draft)
    }

    pub async fn try_generate_flashcards(
        &self,
        text: &str,
        count: u32,
    ) -> Result<FlashcardsDraft, GatewayError> {
        let draft: FlashcardsDraft = self
            .post("/api/flashcards/generate", &FlashcardsBody { text, count })
            .await?;
        if draft.cards.is_empty() {
            return Err(GatewayError::Empty("no flashcards"));
        }
        if draft.cards.iter().any(|card| card.validate().is_err()) {
            return Err(GatewayError::Empty("blank flashcard"));
        }
        Ok(draft)
    }

    pub async fn summarize(&self, text: &str, length: SummaryLength) -> SummaryDraft {
        match self.try_summarize(text, length).await {
            Ok(draft) => draft,
            Err(e) => {
                fallback_used("summary", &e);
                fallback::summary(text)
            }
        }
    }

    pub async fn generate_quiz(&self, text: &str, request: &QuizRequest) -> QuizDraft {
        match self.try_generate_quiz(text, request).await {
            Ok(draft) => draft,
            Err(e) => {
                fallback_used("quiz", &e);
                fallback::quiz()
            }
        }
    }

    pub async fn generate_flashcards(&self, text: &str, count: u32) -> FlashcardsDraft {
        match self.try_generate_flashcards(text, count).await {
            Ok(draft) => draft,
            Err(e) => {
                fallback_used("flashcards", &e);
                fallback::flashcards()
            }
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let resp = self.client.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::HttpStatus { status, body });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn fallback_used(kind: &'static str, err: &GatewayError) {
    tracing::warn!(kind, error = %err, "generation service unavailable, using fallback content");
    metrics::record_generation_fallback(kind);
}
