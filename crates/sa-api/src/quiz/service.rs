use sa_engine::{
    Answers, DEFAULT_TIME_LIMIT_SECS, Navigation, QuestionType, Quiz, QuizDifficulty, QuizScore,
    QuizSession, SessionResult,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    ApiState,
    error::ApiError,
    generation::QuizRequest,
    metrics,
    validation::{truncate_chars, validate_source_text},
};

pub const GENERATED_QUIZ_TITLE: &str = "Generated Quiz";
pub const GENERATED_QUIZ_DESCRIPTION: &str = "Quiz generated from your text";
/// How much of the input text is kept with the quiz
pub const SOURCE_TEXT_CHARS: usize = 1000;

fn quiz_not_found() -> ApiError {
    ApiError::NotFound("Quiz not found".to_string())
}

const fn default_num_questions() -> u32 {
    10
}

fn default_question_types() -> Vec<QuestionType> {
    vec![QuestionType::MultipleChoice, QuestionType::TrueFalse]
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    pub text: String,
    #[serde(default = "default_num_questions")]
    #[validate(range(min = 1, max = 50, message = "Number of questions must be between 1 and 50"))]
    pub num_questions: u32,
    #[serde(default)]
    pub difficulty: QuizDifficulty,
    #[serde(default = "default_question_types")]
    #[validate(length(min = 1, message = "At least one question type is required"))]
    pub question_types: Vec<QuestionType>,
    /// Seconds. Unset or zero means the default limit.
    #[serde(default)]
    #[validate(range(max = 86_400, message = "Time limit must be at most one day"))]
    pub time_limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: Answers,
    /// Seconds, as measured by the client
    #[serde(default)]
    pub time_taken: u64,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

pub async fn generate_quiz(
    state: &ApiState,
    owner_id: Uuid,
    req: GenerateQuizRequest,
) -> Result<Quiz, ApiError> {
    req.validate()?;
    validate_source_text(&req.text)?;

    let request = QuizRequest {
        num_questions: req.num_questions,
        difficulty: req.difficulty,
        question_types: req.question_types,
    };
    let draft = state.gateway.generate_quiz(&req.text, &request).await;

    let non_empty = |s: String, default: &str| {
        if s.trim().is_empty() {
            default.to_string()
        } else {
            s
        }
    };

    let quiz = Quiz {
        id: Uuid::new_v4(),
        owner_id,
        title: non_empty(draft.title, GENERATED_QUIZ_TITLE),
        description: non_empty(draft.description, GENERATED_QUIZ_DESCRIPTION),
        source_text: truncate_chars(&req.text, SOURCE_TEXT_CHARS),
        difficulty: req.difficulty,
        time_limit: req
            .time_limit
            .filter(|&t| t > 0)
            .unwrap_or(DEFAULT_TIME_LIMIT_SECS),
        questions: draft.questions,
        attempts: Vec::new(),
        tags: draft.tags,
        created_at: state.clock.now(),
    };
    state.store.insert_quiz(&quiz).await?;

    tracing::info!(
        quiz_id = %quiz.id,
        %owner_id,
        questions = quiz.questions.len(),
        "quiz created"
    );
    Ok(quiz)
}

pub async fn get_quiz(state: &ApiState, owner_id: Uuid, quiz_id: Uuid) -> Result<Quiz, ApiError> {
    state
        .store
        .find_quiz(owner_id, quiz_id)
        .await?
        .ok_or_else(quiz_not_found)
}

pub async fn list_quizzes(state: &ApiState, owner_id: Uuid) -> Result<Vec<Quiz>, ApiError> {
    state.store.list_quizzes(owner_id).await
}

/// Delete a quiz with its attempts, abandoning any live sessions of it.
pub async fn delete_quiz(state: &ApiState, owner_id: Uuid, quiz_id: Uuid) -> Result<(), ApiError> {
    let abandoned = state.sessions.abandon_quiz(owner_id, quiz_id).await;

    if !state.store.delete_quiz(owner_id, quiz_id).await? {
        return Err(quiz_not_found());
    }

    tracing::info!(%quiz_id, %owner_id, abandoned, "quiz deleted");
    Ok(())
}

/// Score a complete set of answers in one call, without a session.
///
/// Unlike a session submit this does not require every question to be
/// answered.
pub async fn submit_answers(
    state: &ApiState,
    owner_id: Uuid,
    quiz_id: Uuid,
    req: SubmitAnswersRequest,
) -> Result<QuizScore, ApiError> {
    let mut quiz = get_quiz(state, owner_id, quiz_id).await?;
    let (score, attempt) = quiz.record_attempt(req.answers, req.time_taken, state.clock.now())?;

    if !state.store.append_attempt(owner_id, quiz_id, attempt).await? {
        return Err(quiz_not_found());
    }

    metrics::record_quiz_attempt("direct");
    tracing::info!(%quiz_id, score = score.score, total = score.total, "quiz answers submitted");
    Ok(score)
}

pub async fn start_session(
    state: &ApiState,
    owner_id: Uuid,
    quiz_id: Uuid,
) -> Result<QuizSession, ApiError> {
    let quiz = get_quiz(state, owner_id, quiz_id).await?;
    state.sessions.start(&quiz).await
}

pub async fn get_session(
    state: &ApiState,
    owner_id: Uuid,
    session_id: Uuid,
) -> Result<QuizSession, ApiError> {
    state.sessions.snapshot(owner_id, session_id).await
}

pub async fn answer_question(
    state: &ApiState,
    owner_id: Uuid,
    session_id: Uuid,
    index: usize,
    req: AnswerRequest,
) -> Result<QuizSession, ApiError> {
    state
        .sessions
        .answer(owner_id, session_id, index, req.answer)
        .await
}

pub async fn navigate(
    state: &ApiState,
    owner_id: Uuid,
    session_id: Uuid,
    to: Navigation,
) -> Result<QuizSession, ApiError> {
    state.sessions.navigate(owner_id, session_id, to).await
}

pub async fn submit_session(
    state: &ApiState,
    owner_id: Uuid,
    session_id: Uuid,
) -> Result<SessionResult, ApiError> {
    state.sessions.submit(owner_id, session_id).await
}

pub async fn abandon_session(
    state: &ApiState,
    owner_id: Uuid,
    session_id: Uuid,
) -> Result<(), ApiError> {
    state.sessions.abandon(owner_id, session_id).await
}
