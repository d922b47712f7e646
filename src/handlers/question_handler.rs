use actix_web::{post, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::domain::session::SessionState,
    models::dto::{request::GenerateQuestionsRequest, response::SessionSnapshot},
};

/// Both failure modes are checked before a round number is consumed: no
/// upload at all, and an upload whose extraction came back empty.
fn require_document_text(session: &SessionState) -> Result<String, AppError> {
    match &session.document {
        None => Err(AppError::EmptyDocument(
            "no document has been uploaded for this session".to_string(),
        )),
        Some(document) if document.is_extracted_empty() => Err(AppError::EmptyDocument(
            "the uploaded PDF contained no extractable text; it is likely scanned and would \
             require OCR"
                .to_string(),
        )),
        Some(document) => Ok(document.text.clone()),
    }
}

async fn run_generation(
    state: &AppState,
    session: &mut SessionState,
    document_text: &str,
    count: u8,
) -> Result<HttpResponse, AppError> {
    let excluded_topics = session.used_topics();

    match state
        .generator
        .generate(document_text, count, &excluded_topics)
        .await
    {
        Ok(questions) => {
            let set_id = session.commit_question_set(questions);
            log::info!(
                "session {}: committed question set {set_id} for round {}",
                session.id,
                session.round
            );
            Ok(HttpResponse::Created().json(SessionSnapshot::from_state(session)))
        }
        Err(err) => {
            log::warn!("session {}: generation failed: {err}", session.id);
            session.abort_generation();
            Err(err)
        }
    }
}

/// Generate a question set for the current session. An accepted request
/// consumes a round number and a fresh answer-field namespace; on failure no
/// set is committed and the previous one stays visible for a manual retry.
#[post("/api/sessions/{id}/questions")]
pub async fn generate_questions(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<GenerateQuestionsRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let handle = state.sessions.get(&id).await?;
    let mut session = handle.lock().await;

    let document_text = require_document_text(&session)?;
    session.request_generation();
    run_generation(&state, &mut session, &document_text, request.count).await
}

/// Discard the current round (answers and evaluations included), keep the
/// history and topic ledger, and generate a fresh set.
#[post("/api/sessions/{id}/rounds")]
pub async fn start_new_round(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<GenerateQuestionsRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let handle = state.sessions.get(&id).await?;
    let mut session = handle.lock().await;

    let document_text = require_document_text(&session)?;
    session.request_new_round();
    run_generation(&state, &mut session, &document_text, request.count).await
}
