//! End-to-end session flow driven through the HTTP surface, with the
//! external model, transcription, and PDF extraction seams replaced by
//! scripted in-process implementations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;

use viva_server::{
    app_state::AppState,
    config::Config,
    errors::{AppError, AppResult},
    handlers,
    models::dto::response::{
        EvaluationReport, SessionCreatedResponse, SessionSnapshot, TranscriptionOutcomeResponse,
    },
    repositories::InMemorySessionRepository,
    services::{ChatModel, DocumentExtractor, DocumentService, SpeechToText},
};

/// Returns each reply once, in order; repeats the last one after that.
struct ScriptedChatModel {
    replies: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedChatModel {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, _model: &str, _prompt: &str, _temperature: f32) -> AppResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .get(call)
            .or_else(|| self.replies.last())
            .cloned()
            .ok_or_else(|| AppError::ServiceError("no scripted reply".to_string()))?;
        if reply == "<fail>" {
            return Err(AppError::ServiceError("scripted network failure".to_string()));
        }
        Ok(reply)
    }
}

struct FixedSpeechToText {
    transcript: String,
}

#[async_trait]
impl SpeechToText for FixedSpeechToText {
    async fn transcribe(&self, _filename: &str, _audio: Vec<u8>) -> AppResult<String> {
        Ok(self.transcript.clone())
    }
}

struct FixedExtractor {
    text: String,
}

impl DocumentExtractor for FixedExtractor {
    fn extract_text(&self, _bytes: &[u8]) -> AppResult<String> {
        Ok(self.text.clone())
    }
}

const FIRST_SET: &str = r#"```json
[
  {"topic": "empyema", "question": "Stages of empyema?", "answer_key": "Exudative, fibrinopurulent, organizing"},
  {"topic": "chylothorax", "question": "Diagnostic triglyceride level?", "answer_key": "> 110 mg/dL"}
]
```"#;

const GRADES_FOR_TWO: &str = r#"```json
[
  {"score": 9, "feedback": "well structured", "model_answer": "ideal first"},
  {"score": 6, "feedback": "missed the threshold", "model_answer": "ideal second"}
]
```"#;

const SECOND_SET: &str = r#"```json
[
  {"topic": "achalasia", "question": "Gold-standard diagnostic test?", "answer_key": "High-resolution manometry"}
]
```"#;

fn app_state(replies: &[&str], transcript: &str) -> AppState {
    AppState::with_components(
        Arc::new(InMemorySessionRepository::new()),
        Arc::new(ScriptedChatModel::new(replies)),
        Arc::new(FixedSpeechToText {
            transcript: transcript.to_string(),
        }),
        Arc::new(DocumentService::new(Arc::new(FixedExtractor {
            text: "Chapter 1: pleural disease. Chapter 2: esophagus.".to_string(),
        }))),
        Config::from_env(),
    )
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .service(handlers::create_session)
                .service(handlers::get_session)
                .service(handlers::upload_document)
                .service(handlers::generate_questions)
                .service(handlers::start_new_round)
                .service(handlers::set_answer)
                .service(handlers::transcribe_answer)
                .service(handlers::evaluate_answers),
        )
        .await
    };
}

macro_rules! create_session_and_upload {
    ($app:expr) => {{
        let created: SessionCreatedResponse = test::read_body_json(
            test::call_service(
                $app,
                test::TestRequest::post().uri("/api/sessions").to_request(),
            )
            .await,
        )
        .await;

        let resp = test::call_service(
            $app,
            test::TestRequest::post()
                .uri(&format!(
                    "/api/sessions/{}/document?filename=manual.pdf",
                    created.session_id
                ))
                .set_payload("%PDF-1.7 fake bytes")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        created.session_id
    }};
}

#[actix_web::test]
async fn full_study_session_flow() {
    let state = app_state(&[FIRST_SET, GRADES_FOR_TWO, SECOND_SET], "spoken addendum");
    let app = init_app!(state);

    let session_id = create_session_and_upload!(&app);

    // round one: generate two questions
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/sessions/{session_id}/questions"))
            .set_json(serde_json::json!({"count": 2}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let snapshot: SessionSnapshot = test::read_body_json(resp).await;
    assert_eq!(snapshot.round, 1);
    assert_eq!(snapshot.questions.len(), 2);
    assert_eq!(snapshot.answers, vec!["", ""]);
    assert_eq!(snapshot.used_topics, vec!["chylothorax", "empyema"]);
    let token = snapshot.round_token;

    // type an answer, then dictate an addendum onto it
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/sessions/{session_id}/answers/0"))
            .set_json(serde_json::json!({"round_token": token, "text": "typed start"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let dictation_uri = format!(
        "/api/sessions/{session_id}/answers/0/dictation?filename=rec.wav&round_token={token}"
    );
    let outcome: TranscriptionOutcomeResponse = test::read_body_json(
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&dictation_uri)
                .set_payload(&b"wav-bytes"[..])
                .to_request(),
        )
        .await,
    )
    .await;
    assert!(outcome.merged);
    assert_eq!(outcome.answer, "typed start spoken addendum");

    // the same recording delivered again is a no-op
    let outcome: TranscriptionOutcomeResponse = test::read_body_json(
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&dictation_uri)
                .set_payload(&b"wav-bytes"[..])
                .to_request(),
        )
        .await,
    )
    .await;
    assert!(outcome.already_transcribed);
    assert_eq!(outcome.answer, "typed start spoken addendum");

    // evaluate the round
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/sessions/{session_id}/evaluation"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let report: EvaluationReport = test::read_body_json(resp).await;
    assert_eq!(report.summary.total, 15);
    assert_eq!(report.summary.max, 20);
    assert_eq!(report.summary.percentage, 75.0);
    assert!(!report.stale);

    // round two: fresh set, cleared answers, ledger only grows
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/sessions/{session_id}/rounds"))
            .set_json(serde_json::json!({"count": 1}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let snapshot: SessionSnapshot = test::read_body_json(resp).await;
    assert_eq!(snapshot.round, 2);
    assert_eq!(snapshot.questions.len(), 1);
    assert_eq!(snapshot.answers, vec![""]);
    assert!(snapshot.evaluation.is_none());
    assert_eq!(
        snapshot.used_topics,
        vec!["achalasia", "chylothorax", "empyema"]
    );
    assert_eq!(snapshot.previous_sets.len(), 2);
    assert_ne!(snapshot.round_token, token);

    // inputs keyed to the discarded round are rejected
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/sessions/{session_id}/answers/0"))
            .set_json(serde_json::json!({"round_token": token, "text": "stale input"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn failed_generation_commits_nothing_but_consumes_the_round() {
    let state = app_state(&["<fail>", FIRST_SET], "unused");
    let app = init_app!(state);

    let session_id = create_session_and_upload!(&app);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/sessions/{session_id}/questions"))
            .set_json(serde_json::json!({"count": 2}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let snapshot: SessionSnapshot = test::read_body_json(
        test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/sessions/{session_id}"))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(snapshot.round, 1);
    assert!(snapshot.questions.is_empty());
    assert!(snapshot.used_topics.is_empty());
    assert!(snapshot.previous_sets.is_empty());

    // manual retry succeeds and commits
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/sessions/{session_id}/questions"))
            .set_json(serde_json::json!({"count": 2}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let snapshot: SessionSnapshot = test::read_body_json(resp).await;
    assert_eq!(snapshot.round, 2);
    assert_eq!(snapshot.previous_sets.len(), 1);
    assert_eq!(snapshot.used_topics, vec!["chylothorax", "empyema"]);
}

#[actix_web::test]
async fn failed_evaluation_retains_the_previous_report() {
    let state = app_state(&[FIRST_SET, GRADES_FOR_TWO, "<fail>"], "unused");
    let app = init_app!(state);

    let session_id = create_session_and_upload!(&app);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/sessions/{session_id}/questions"))
            .set_json(serde_json::json!({"count": 2}))
            .to_request(),
    )
    .await;
    let snapshot: SessionSnapshot = test::read_body_json(resp).await;
    let token = snapshot.round_token;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/sessions/{session_id}/evaluation"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // change an answer, then fail the re-evaluation
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/sessions/{session_id}/answers/0"))
            .set_json(serde_json::json!({"round_token": token, "text": "revised"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/sessions/{session_id}/evaluation"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    // the old report is still served, flagged as stale
    let snapshot: SessionSnapshot = test::read_body_json(
        test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/sessions/{session_id}"))
                .to_request(),
        )
        .await,
    )
    .await;
    let report = snapshot.evaluation.expect("previous report retained");
    assert!(report.stale);
    assert_eq!(report.summary.total, 15);
}

#[actix_web::test]
async fn sessions_do_not_share_any_state() {
    let state = app_state(&[FIRST_SET], "unused");
    let app = init_app!(state);

    let first = create_session_and_upload!(&app);
    let second = create_session_and_upload!(&app);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/sessions/{first}/questions"))
            .set_json(serde_json::json!({"count": 2}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let snapshot: SessionSnapshot = test::read_body_json(
        test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/sessions/{second}"))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(snapshot.round, 0);
    assert!(snapshot.used_topics.is_empty());
}
