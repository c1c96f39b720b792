//! The timed quiz session state machine.
//!
//! A session drives one attempt at a quiz. It is created `InProgress`, moves
//! between questions, captures answers, and ends `Submitted` either on a
//! manual submit (all questions answered) or when the countdown reaches
//! zero. Once submitted every mutating call fails with
//! [`EngineError::InvalidState`].
//!
//! The countdown is driven from outside by calling [`QuizSession::tick`]
//! once per elapsed second.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::EngineError,
    quiz::{Answers, Question, Quiz, QuizAttempt, QuizScore, score_answers},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    InProgress,
    Submitted,
}

/// How the session reached `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    Manual,
    Auto,
}

impl SubmitMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }
}

/// A navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", content = "index", rename_all = "snake_case")]
pub enum Navigation {
    Next,
    Previous,
    JumpTo(usize),
}

/// The outcome of a finished session, ready to be appended to the quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResult {
    pub quiz_id: Uuid,
    pub mode: SubmitMode,
    pub score: QuizScore,
    pub attempt: QuizAttempt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Running { remaining_seconds: u32 },
    Expired(SessionResult),
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizSession {
    id: Uuid,
    quiz_id: Uuid,
    owner_id: Uuid,
    #[serde(skip)]
    questions: Vec<Question>,
    question_count: usize,
    current_question_index: usize,
    answers: Answers,
    remaining_seconds: u32,
    time_limit: u32,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    phase: SessionPhase,
}

impl QuizSession {
    /// Begin an attempt at `quiz`.
    pub fn start(quiz: &Quiz, now: DateTime<Utc>) -> Result<Self, EngineError> {
        if quiz.questions.is_empty() {
            return Err(EngineError::validation("Quiz has no questions"));
        }

        let time_limit = quiz.effective_time_limit();
        Ok(Self {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            owner_id: quiz.owner_id,
            questions: quiz.questions.clone(),
            question_count: quiz.questions.len(),
            current_question_index: 0,
            answers: Answers::new(),
            remaining_seconds: time_limit,
            time_limit,
            started_at: now,
            submitted_at: None,
            phase: SessionPhase::InProgress,
        })
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub const fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub const fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub const fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub const fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub const fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_question_index]
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.answers.contains_key(&index)
    }

    /// Record `value` as the answer to question `index`. The current
    /// question pointer does not move.
    pub fn answer(&mut self, index: usize, value: impl Into<String>) -> Result<(), EngineError> {
        self.ensure_in_progress()?;
        self.check_index(index)?;
        self.answers.insert(index, value.into());
        Ok(())
    }

    /// Move to another question and return the new index.
    pub fn navigate(&mut self, to: Navigation) -> Result<usize, EngineError> {
        self.ensure_in_progress()?;

        let target = match to {
            Navigation::Next => {
                if !self.is_answered(self.current_question_index) {
                    return Err(EngineError::validation(
                        "Answer the current question before moving on",
                    ));
                }
                if self.current_question_index + 1 >= self.question_count {
                    return Err(EngineError::validation("Already at the last question"));
                }
                self.current_question_index + 1
            }
            Navigation::Previous => {
                if self.current_question_index == 0 {
                    return Err(EngineError::validation("Already at the first question"));
                }
                self.current_question_index - 1
            }
            Navigation::JumpTo(index) => {
                self.check_index(index)?;
                index
            }
        };

        self.current_question_index = target;
        Ok(target)
    }

    /// Advance the countdown by one second, auto-submitting at zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickOutcome, EngineError> {
        self.ensure_in_progress()?;

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            tracing::debug!(session_id = %self.id, quiz_id = %self.quiz_id, "countdown expired");
            return Ok(TickOutcome::Expired(self.finalize(SubmitMode::Auto, now)));
        }

        Ok(TickOutcome::Running {
            remaining_seconds: self.remaining_seconds,
        })
    }

    /// Manual submission. Every question must have an answer.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<SessionResult, EngineError> {
        self.ensure_in_progress()?;

        if self.answers.len() != self.question_count {
            return Err(EngineError::validation(format!(
                "All questions must be answered before submitting ({} of {} answered)",
                self.answers.len(),
                self.question_count
            )));
        }

        Ok(self.finalize(SubmitMode::Manual, now))
    }

    fn finalize(&mut self, mode: SubmitMode, now: DateTime<Utc>) -> SessionResult {
        self.phase = SessionPhase::Submitted;
        self.submitted_at = Some(now);

        let score = score_answers(&self.questions, &self.answers);
        SessionResult {
            quiz_id: self.quiz_id,
            mode,
            score,
            attempt: QuizAttempt {
                date: now,
                score: score.score,
                answers: self.answers.clone(),
                time_taken: u64::from(self.time_limit - self.remaining_seconds),
            },
        }
    }

    fn ensure_in_progress(&self) -> Result<(), EngineError> {
        match self.phase {
            SessionPhase::InProgress => Ok(()),
            SessionPhase::Submitted => Err(EngineError::invalid_state(
                "Quiz session has already been submitted",
            )),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), EngineError> {
        if index >= self.question_count {
            return Err(EngineError::validation(format!(
                "Question index {index} is out of range (quiz has {} questions)",
                self.question_count
            )));
        }
        Ok(())
    }
}
