use std::time::Duration as StdDuration;

use axum::{Json, Router, http::StatusCode, routing::post};
use sa_engine::{Question, QuestionType, Quiz, QuizDifficulty, QuizScore};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::common::{TestContext, TestStateBuilder, stub_gateway, test_user};

const TEXT: &str = "The mitochondria is the powerhouse of the cell.";

async fn generate_quiz(ctx: &TestContext, token: &str, body: Value) -> Quiz {
    let response = ctx
        .client
        .post_json_with_auth("/quiz/generate", &body, token)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

/// A two question quiz inserted straight into the store
async fn seed_quiz(ctx: &TestContext, owner_id: Uuid, time_limit: u32) -> Quiz {
    let question = |text: &str, correct: &str| Question {
        question: text.to_string(),
        kind: QuestionType::MultipleChoice,
        options: vec!["A".into(), "B".into(), "C".into()],
        correct_answer: correct.to_string(),
        explanation: String::new(),
    };
    let quiz = Quiz {
        id: Uuid::new_v4(),
        owner_id,
        title: "Seeded".to_string(),
        description: String::new(),
        source_text: String::new(),
        difficulty: QuizDifficulty::Easy,
        time_limit,
        questions: vec![question("First?", "A"), question("Second?", "B")],
        attempts: Vec::new(),
        tags: Vec::new(),
        created_at: ctx.now(),
    };
    ctx.state.store.insert_quiz(&quiz).await.unwrap();
    quiz
}

async fn fetch_quiz(ctx: &TestContext, token: &str, quiz_id: Uuid) -> Quiz {
    let response = ctx
        .client
        .get_with_auth(&format!("/quiz/{quiz_id}"), token)
        .await;
    response.assert_status(StatusCode::OK);
    response.json()
}

async fn start_session(ctx: &TestContext, token: &str, quiz_id: Uuid) -> Value {
    let response = ctx
        .client
        .post_with_auth(&format!("/quiz/{quiz_id}/sessions"), token)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

fn session_uri(session: &Value, suffix: &str) -> String {
    format!("/quiz/sessions/{}{suffix}", session["id"].as_str().unwrap())
}

#[tokio::test]
async fn test_generate_quiz_falls_back() {
    let ctx = TestStateBuilder::new().build();
    let (user_id, token) = test_user();

    let quiz = generate_quiz(&ctx, &token, json!({ "text": TEXT })).await;
    assert_eq!(quiz.owner_id, user_id);
    assert_eq!(quiz.title, "Practice Quiz");
    assert_eq!(quiz.questions.len(), 2);
    assert_eq!(quiz.time_limit, 600);
    assert_eq!(quiz.difficulty, QuizDifficulty::Medium);
    assert_eq!(quiz.tags, ["practice", "generated"]);
    assert!(quiz.attempts.is_empty());

    let response = ctx
        .client
        .get_with_auth(&format!("/quiz/{}", quiz.id), &token)
        .await;
    let body: Value = response.json();
    assert!(body.get("source_text").is_none());
}

#[tokio::test]
async fn test_generate_quiz_from_service() {
    let gateway = stub_gateway(Router::new().route(
        "/api/quiz/generate",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["num_questions"], 1);
            assert_eq!(body["difficulty"], "hard");
            Json(json!({
                "title": "",
                "questions": [{
                    "question": "What is the powerhouse of the cell?",
                    "type": "multiple_choice",
                    "options": ["Nucleus", "Mitochondria"],
                    "correctAnswer": "Mitochondria"
                }],
                "tags": ["biology"]
            }))
        }),
    ))
    .await;
    let ctx = TestStateBuilder::new().gateway_url(gateway).build();
    let (_, token) = test_user();

    let quiz = generate_quiz(
        &ctx,
        &token,
        json!({ "text": TEXT, "num_questions": 1, "difficulty": "hard", "time_limit": 0 }),
    )
    .await;
    assert_eq!(quiz.title, "Generated Quiz");
    assert_eq!(quiz.description, "Quiz generated from your text");
    assert_eq!(quiz.difficulty, QuizDifficulty::Hard);
    assert_eq!(quiz.time_limit, 600);
    assert_eq!(quiz.questions[0].correct_answer, "Mitochondria");
    assert_eq!(quiz.tags, ["biology"]);
}

#[tokio::test]
async fn test_generate_quiz_rejects_bad_input() {
    let ctx = TestStateBuilder::new().build();
    let (_, token) = test_user();

    let cases = [
        json!({ "text": "" }),
        json!({ "text": TEXT, "num_questions": 0 }),
        json!({ "text": TEXT, "num_questions": 51 }),
        json!({ "text": TEXT, "question_types": [] }),
    ];
    for body in cases {
        let response = ctx
            .client
            .post_json_with_auth("/quiz/generate", &body, &token)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    let quizzes: Vec<Quiz> = ctx.client.get_with_auth("/quiz/list", &token).await.json();
    assert!(quizzes.is_empty());
}

#[tokio::test]
async fn test_submit_answers_scores_exactly() {
    let ctx = TestStateBuilder::new().build();
    let (_, token) = test_user();
    let quiz = generate_quiz(&ctx, &token, json!({ "text": TEXT })).await;

    let response = ctx
        .client
        .post_json_with_auth(
            &format!("/quiz/{}/submit", quiz.id),
            &json!({ "answers": { "0": "Learning", "1": "true" }, "time_taken": 42 }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let score: QuizScore = response.json();
    assert_eq!(score.score, 1);
    assert_eq!(score.total, 2);
    assert_eq!(score.percentage, 50.0);

    let stored = fetch_quiz(&ctx, &token, quiz.id).await;
    assert_eq!(stored.attempts.len(), 1);
    assert_eq!(stored.attempts[0].score, 1);
    assert_eq!(stored.attempts[0].time_taken, 42);
    assert_eq!(stored.attempts[0].date, ctx.now());
}

#[tokio::test]
async fn test_submit_answers_rejects_out_of_range_index() {
    let ctx = TestStateBuilder::new().build();
    let (_, token) = test_user();
    let quiz = generate_quiz(&ctx, &token, json!({ "text": TEXT })).await;

    let response = ctx
        .client
        .post_json_with_auth(
            &format!("/quiz/{}/submit", quiz.id),
            &json!({ "answers": { "5": "Learning" } }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(fetch_quiz(&ctx, &token, quiz.id).await.attempts.is_empty());
}

#[tokio::test]
async fn test_session_flow() {
    let ctx = TestStateBuilder::new().build();
    let (user_id, token) = test_user();
    let quiz = seed_quiz(&ctx, user_id, 120).await;

    let session = start_session(&ctx, &token, quiz.id).await;
    assert_eq!(session["phase"], "IN_PROGRESS");
    assert_eq!(session["current_question_index"], 0);
    assert_eq!(session["remaining_seconds"], 120);
    assert_eq!(session["question_count"], 2);

    // Moving on needs an answer first
    let response = ctx
        .client
        .post_json_with_auth(
            &session_uri(&session, "/navigate"),
            &json!({ "direction": "next" }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .client
        .put_json_with_auth(
            &session_uri(&session, "/answers/0"),
            &json!({ "answer": "A" }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let snapshot: Value = response.json();
    assert_eq!(snapshot["answers"]["0"], "A");
    assert_eq!(snapshot["current_question_index"], 0);

    let response = ctx
        .client
        .post_json_with_auth(
            &session_uri(&session, "/navigate"),
            &json!({ "direction": "next" }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let snapshot: Value = response.json();
    assert_eq!(snapshot["current_question_index"], 1);

    // Incomplete sessions cannot be submitted
    let response = ctx
        .client
        .post_with_auth(&session_uri(&session, "/submit"), &token)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.client
        .put_json_with_auth(
            &session_uri(&session, "/answers/1"),
            &json!({ "answer": "C" }),
            &token,
        )
        .await
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post_with_auth(&session_uri(&session, "/submit"), &token)
        .await;
    response.assert_status(StatusCode::OK);
    let result: Value = response.json();
    assert_eq!(result["mode"], "manual");
    assert_eq!(result["score"]["score"], 1);
    assert_eq!(result["score"]["total"], 2);
    assert_eq!(result["score"]["percentage"], 50.0);

    let response = ctx
        .client
        .post_with_auth(&session_uri(&session, "/submit"), &token)
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let response = ctx
        .client
        .put_json_with_auth(
            &session_uri(&session, "/answers/0"),
            &json!({ "answer": "B" }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let stored = fetch_quiz(&ctx, &token, quiz.id).await;
    assert_eq!(stored.attempts.len(), 1);
    assert_eq!(stored.attempts[0].answers.get(&0).map(String::as_str), Some("A"));

    let snapshot: Value = ctx
        .client
        .get_with_auth(&session_uri(&session, ""), &token)
        .await
        .json();
    assert_eq!(snapshot["phase"], "SUBMITTED");
}

#[tokio::test]
async fn test_session_navigation_rules() {
    let ctx = TestStateBuilder::new().build();
    let (user_id, token) = test_user();
    let quiz = seed_quiz(&ctx, user_id, 120).await;
    let session = start_session(&ctx, &token, quiz.id).await;
    let uri = session_uri(&session, "/navigate");

    let response = ctx
        .client
        .post_json_with_auth(&uri, &json!({ "direction": "previous" }), &token)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .client
        .post_json_with_auth(&uri, &json!({ "direction": "jump_to", "index": 1 }), &token)
        .await;
    response.assert_status(StatusCode::OK);
    let snapshot: Value = response.json();
    assert_eq!(snapshot["current_question_index"], 1);

    let response = ctx
        .client
        .post_json_with_auth(&uri, &json!({ "direction": "jump_to", "index": 2 }), &token)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .client
        .post_json_with_auth(&uri, &json!({ "direction": "previous" }), &token)
        .await;
    response.assert_status(StatusCode::OK);
    let snapshot: Value = response.json();
    assert_eq!(snapshot["current_question_index"], 0);

    let response = ctx
        .client
        .put_json_with_auth(
            &session_uri(&session, "/answers/7"),
            &json!({ "answer": "A" }),
            &token,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_auto_submits_once() {
    let ctx = TestStateBuilder::new().build();
    let (user_id, token) = test_user();
    let quiz = seed_quiz(&ctx, user_id, 3).await;
    let session = start_session(&ctx, &token, quiz.id).await;

    ctx.client
        .put_json_with_auth(
            &session_uri(&session, "/answers/0"),
            &json!({ "answer": "A" }),
            &token,
        )
        .await
        .assert_status(StatusCode::OK);

    tokio::time::sleep(StdDuration::from_secs(5)).await;

    let snapshot: Value = ctx
        .client
        .get_with_auth(&session_uri(&session, ""), &token)
        .await
        .json();
    assert_eq!(snapshot["phase"], "SUBMITTED");
    assert_eq!(snapshot["remaining_seconds"], 0);

    let response = ctx
        .client
        .post_with_auth(&session_uri(&session, "/submit"), &token)
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let stored = fetch_quiz(&ctx, &token, quiz.id).await;
    assert_eq!(stored.attempts.len(), 1);
    assert_eq!(stored.attempts[0].score, 1);
    assert_eq!(stored.attempts[0].time_taken, 3);
}

#[tokio::test]
async fn test_abandoned_session_records_nothing() {
    let ctx = TestStateBuilder::new().build();
    let (user_id, token) = test_user();
    let quiz = seed_quiz(&ctx, user_id, 120).await;
    let session = start_session(&ctx, &token, quiz.id).await;

    ctx.client
        .delete_with_auth(&session_uri(&session, ""), &token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    ctx.client
        .get_with_auth(&session_uri(&session, ""), &token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert!(fetch_quiz(&ctx, &token, quiz.id).await.attempts.is_empty());
}

#[tokio::test]
async fn test_sessions_are_private_to_their_owner() {
    let ctx = TestStateBuilder::new().build();
    let (alice_id, alice) = test_user();
    let (_, bob) = test_user();
    let quiz = seed_quiz(&ctx, alice_id, 120).await;

    ctx.client
        .post_with_auth(&format!("/quiz/{}/sessions", quiz.id), &bob)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let session = start_session(&ctx, &alice, quiz.id).await;
    let response = ctx
        .client
        .put_json_with_auth(
            &session_uri(&session, "/answers/0"),
            &json!({ "answer": "A" }),
            &bob,
        )
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Quiz session not found");

    let snapshot: Value = ctx
        .client
        .get_with_auth(&session_uri(&session, ""), &alice)
        .await
        .json();
    assert!(snapshot["answers"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_quiz_ends_its_sessions() {
    let ctx = TestStateBuilder::new().build();
    let (user_id, token) = test_user();
    let quiz = seed_quiz(&ctx, user_id, 120).await;
    let session = start_session(&ctx, &token, quiz.id).await;

    ctx.client
        .delete_with_auth(&format!("/quiz/{}", quiz.id), &token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    ctx.client
        .get_with_auth(&session_uri(&session, ""), &token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    ctx.client
        .get_with_auth(&format!("/quiz/{}", quiz.id), &token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    ctx.client
        .delete_with_auth(&format!("/quiz/{}", quiz.id), &token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert!(ctx.state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_list_quizzes_newest_first() {
    let ctx = TestStateBuilder::new().build();
    let (_, token) = test_user();
    let older = generate_quiz(&ctx, &token, json!({ "text": TEXT })).await;
    ctx.clock.advance(chrono::Duration::minutes(5));
    let newer = generate_quiz(&ctx, &token, json!({ "text": TEXT })).await;

    let quizzes: Vec<Quiz> = ctx.client.get_with_auth("/quiz/list", &token).await.json();
    let ids: Vec<_> = quizzes.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}
