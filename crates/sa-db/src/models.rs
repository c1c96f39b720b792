use std::str::FromStr;

use chrono::{DateTime, Utc};
use sa_engine::{Card, FlashcardDeck, Question, Quiz, QuizAttempt, StudySession};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Requested summary length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl FromStr for SummaryLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            other => Err(format!(
                "Invalid summary length: '{other}'. Must be one of short, medium, long"
            )),
        }
    }
}

/// Whitespace-separated word counts of a summary and its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub original: u32,
    pub summary: u32,
}

impl WordCount {
    pub fn of(original: &str, summary: &str) -> Self {
        Self {
            original: count_words(original),
            summary: count_words(summary),
        }
    }
}

fn count_words(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

/// Summary model - AI-generated summary of user supplied text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Unique summary identifier
    pub id: Uuid,
    /// Owning user
    pub owner_id: Uuid,
    /// Title (max 200 chars)
    pub title: String,
    /// The text that was summarized
    pub original_text: String,
    /// The generated summary
    pub summary: String,
    /// Requested length
    pub length: SummaryLength,
    /// Word counts of source and summary
    pub word_count: WordCount,
    /// Keywords returned by the generator
    pub tags: Vec<String>,
    /// When the summary was created
    pub created_at: DateTime<Utc>,
}

/// Row of the `flashcard_decks` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeckRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Embedded cards in creation order
    pub cards: Json<Vec<Card>>,
    /// Append-only study log
    pub study_sessions: Json<Vec<StudySession>>,
    pub created_at: DateTime<Utc>,
    pub last_studied: Option<DateTime<Utc>>,
}

impl From<DeckRow> for FlashcardDeck {
    fn from(row: DeckRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            cards: row.cards.0,
            study_sessions: row.study_sessions.0,
            created_at: row.created_at,
            last_studied: row.last_studied,
        }
    }
}

/// Row of the `quizzes` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuizRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub source_text: String,
    /// One of `easy`, `medium`, `hard` (enforced by a CHECK constraint)
    pub difficulty: String,
    /// Seconds
    pub time_limit: i32,
    pub questions: Json<Vec<Question>>,
    pub attempts: Json<Vec<QuizAttempt>>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            source_text: row.source_text,
            difficulty: row.difficulty.parse().unwrap_or_default(),
            time_limit: u32::try_from(row.time_limit).unwrap_or_default(),
            questions: row.questions.0,
            attempts: row.attempts.0,
            tags: row.tags,
            created_at: row.created_at,
        }
    }
}

/// Row of the `summaries` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SummaryRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub original_text: String,
    pub summary: String,
    pub length: String,
    pub word_count_original: i32,
    pub word_count_summary: i32,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SummaryRow> for Summary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            original_text: row.original_text,
            summary: row.summary,
            length: row.length.parse().unwrap_or_default(),
            word_count: WordCount {
                original: u32::try_from(row.word_count_original).unwrap_or_default(),
                summary: u32::try_from(row.word_count_summary).unwrap_or_default(),
            },
            tags: row.tags,
            created_at: row.created_at,
        }
    }
}
