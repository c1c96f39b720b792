use sa_engine::{NewCard, Question, QuestionType};

use super::client::{FlashcardsDraft, QuizDraft, SummaryDraft};

const SUMMARY_PREVIEW_CHARS: usize = 200;

pub(super) fn summary(text: &str) -> SummaryDraft {
    let preview: String = text.chars().take(SUMMARY_PREVIEW_CHARS).collect();
    SummaryDraft {
        summary: format!("{preview}... (AI service temporarily unavailable)"),
        keywords: vec!["summary".into(), "text".into(), "content".into()],
    }
}

pub(super) fn quiz() -> QuizDraft {
    QuizDraft {
        title: "Practice Quiz".to_string(),
        description: "Quiz generated from your content".to_string(),
        questions: vec![
            Question {
                question: "What is the main topic of the provided text?".to_string(),
                kind: QuestionType::MultipleChoice,
                options: vec![
                    "Learning".into(),
                    "Technology".into(),
                    "Science".into(),
                    "History".into(),
                ],
                correct_answer: "Learning".to_string(),
                explanation: "Based on the content provided.".to_string(),
            },
            Question {
                question: "The provided text contains important information.".to_string(),
                kind: QuestionType::TrueFalse,
                options: vec!["True".into(), "False".into()],
                correct_answer: "True".to_string(),
                explanation: "The text contains study material.".to_string(),
            },
        ],
        tags: vec!["practice".into(), "generated".into()],
    }
}

pub(super) fn flashcards() -> FlashcardsDraft {
    FlashcardsDraft {
        title: "Study Flashcards".to_string(),
        cards: vec![
            NewCard::new("What is the main concept?", "The main concept from your text."),
            NewCard::new(
                "Key point to remember?",
                "Important information from the content.",
            ),
        ],
    }
}
