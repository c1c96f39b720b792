//! Study engine for the study-aid service.
//!
//! This crate holds the pure domain logic: the spaced repetition scheduler,
//! the flashcard deck aggregate, quizzes and their scoring, and the timed
//! quiz session state machine. Nothing here performs I/O; callers pass the
//! current time in, usually taken from a [`Clock`].

pub mod card;
pub mod clock;
pub mod deck;
pub mod error;
pub mod quiz;
pub mod scheduler;
pub mod session;

pub use card::{Card, NewCard};
pub use clock::{Clock, ManualClock, SystemClock};
pub use deck::{FlashcardDeck, StudySession};
pub use error::EngineError;
pub use quiz::{
    Answers, DEFAULT_TIME_LIMIT_SECS, Question, QuestionType, Quiz, QuizAttempt, QuizDifficulty,
    QuizScore, score_answers,
};
pub use scheduler::{Difficulty, interval_days, schedule_next_review};
pub use session::{Navigation, QuizSession, SessionPhase, SessionResult, SubmitMode, TickOutcome};
