//! Quizzes, their questions, and scoring.

use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// Time limit used when a quiz does not set one.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 600;

/// Answers keyed by question index.
pub type Answers = BTreeMap<usize, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl QuizDifficulty {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl FromStr for QuizDifficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(EngineError::validation(format!(
                "Invalid difficulty: '{other}'. Must be one of easy, medium, hard"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// One scored submission of a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub date: DateTime<Utc>,
    pub score: u32,
    pub answers: Answers,
    /// Seconds
    pub time_taken: u64,
}

/// Result of scoring a set of answers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizScore {
    pub score: u32,
    pub total: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    /// Never sent back to clients
    #[serde(default, skip_serializing)]
    pub source_text: String,
    pub difficulty: QuizDifficulty,
    pub time_limit: u32,
    /// Immutable once the quiz exists
    pub questions: Vec<Question>,
    /// Append-only
    pub attempts: Vec<QuizAttempt>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// The countdown a session starts with. Zero counts as unset.
    pub const fn effective_time_limit(&self) -> u32 {
        if self.time_limit == 0 {
            DEFAULT_TIME_LIMIT_SECS
        } else {
            self.time_limit
        }
    }

    pub fn score(&self, answers: &Answers) -> QuizScore {
        score_answers(&self.questions, answers)
    }

    /// Score `answers` and append the attempt. Earlier attempts are not touched.
    pub fn record_attempt(
        &mut self,
        answers: Answers,
        time_taken: u64,
        now: DateTime<Utc>,
    ) -> Result<(QuizScore, &QuizAttempt), EngineError> {
        if self.questions.is_empty() {
            return Err(EngineError::validation("Quiz has no questions"));
        }
        check_answer_indices(&answers, self.questions.len())?;

        let score = self.score(&answers);
        self.attempts.push(QuizAttempt {
            date: now,
            score: score.score,
            answers,
            time_taken,
        });
        Ok((score, &self.attempts[self.attempts.len() - 1]))
    }
}

/// Award one point per answer equal to the question's correct answer.
///
/// Comparison is exact: no trimming or case folding.
pub fn score_answers(questions: &[Question], answers: &Answers) -> QuizScore {
    let score = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i) == Some(&q.correct_answer))
        .count() as u32;
    let total = questions.len() as u32;
    let percentage = if total == 0 {
        0.0
    } else {
        100.0 * f64::from(score) / f64::from(total)
    };

    QuizScore {
        score,
        total,
        percentage,
    }
}

pub(crate) fn check_answer_indices(answers: &Answers, len: usize) -> Result<(), EngineError> {
    match answers.keys().find(|&&i| i >= len) {
        Some(i) => Err(EngineError::validation(format!(
            "Question index {i} is out of range (quiz has {len} questions)"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn question(correct: &str) -> Question {
        Question {
            question: format!("Pick {correct}"),
            kind: QuestionType::MultipleChoice,
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer: correct.to_string(),
            explanation: String::new(),
        }
    }

    pub(crate) fn quiz(corrects: &[&str]) -> Quiz {
        Quiz {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Sample".into(),
            description: String::new(),
            source_text: "source".into(),
            difficulty: QuizDifficulty::Medium,
            time_limit: 0,
            questions: corrects.iter().map(|c| question(c)).collect(),
            attempts: Vec::new(),
            tags: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn answers(pairs: &[(usize, &str)]) -> Answers {
        pairs.iter().map(|(i, a)| (*i, a.to_string())).collect()
    }

    #[test]
    fn test_half_right() {
        let quiz = quiz(&["A", "B"]);
        let score = quiz.score(&answers(&[(0, "A"), (1, "C")]));
        assert_eq!(score.score, 1);
        assert_eq!(score.total, 2);
        assert_eq!(score.percentage, 50.0);
    }

    #[test]
    fn test_exact_match_only() {
        let quiz = quiz(&["True", "Paris"]);
        let score = quiz.score(&answers(&[(0, "true"), (1, "Paris ")]));
        assert_eq!(score.score, 0);
        assert_eq!(score.percentage, 0.0);
    }

    #[test]
    fn test_missing_answers_score_zero() {
        let quiz = quiz(&["A", "B", "C", "D"]);
        let score = quiz.score(&answers(&[(2, "C")]));
        assert_eq!(score.score, 1);
        assert_eq!(score.percentage, 25.0);
    }

    #[test]
    fn test_effective_time_limit() {
        let mut quiz = quiz(&["A"]);
        assert_eq!(quiz.effective_time_limit(), DEFAULT_TIME_LIMIT_SECS);
        quiz.time_limit = 90;
        assert_eq!(quiz.effective_time_limit(), 90);
    }

    #[test]
    fn test_record_attempt_appends() {
        let mut quiz = quiz(&["A", "B"]);
        let now = Utc::now();
        let (score, attempt) = quiz.record_attempt(answers(&[(0, "A")]), 30, now).unwrap();
        assert_eq!(score.score, 1);
        assert_eq!(attempt.time_taken, 30);

        let first = quiz.attempts[0].clone();
        quiz.record_attempt(answers(&[(0, "A"), (1, "B")]), 45, now)
            .unwrap();
        assert_eq!(quiz.attempts.len(), 2);
        assert_eq!(quiz.attempts[0], first);
        assert_eq!(quiz.attempts[1].score, 2);
    }

    #[test]
    fn test_record_attempt_rejects_bad_index() {
        let mut quiz = quiz(&["A"]);
        let err = quiz
            .record_attempt(answers(&[(3, "A")]), 0, Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(quiz.attempts.is_empty());
    }

    #[test]
    fn test_quiz_difficulty_from_str() {
        assert_eq!("hard".parse::<QuizDifficulty>().unwrap(), QuizDifficulty::Hard);
        assert_eq!(
            QuizDifficulty::Easy.as_str().parse::<QuizDifficulty>().unwrap(),
            QuizDifficulty::Easy
        );
        assert!("Hard".parse::<QuizDifficulty>().is_err());
    }

    #[test]
    fn test_question_accepts_camel_case_answer() {
        let q: Question = serde_json::from_str(
            r#"{"question":"2+2?","type":"multiple_choice","options":["3","4"],"correctAnswer":"4"}"#,
        )
        .unwrap();
        assert_eq!(q.correct_answer, "4");
        assert!(q.explanation.is_empty());
    }

    #[test]
    fn test_source_text_not_serialized() {
        let quiz = quiz(&["A"]);
        let json = serde_json::to_value(&quiz).unwrap();
        assert!(json.get("source_text").is_none());
        assert_eq!(json["questions"][0]["type"], "multiple_choice");
    }
}
