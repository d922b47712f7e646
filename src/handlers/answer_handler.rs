use actix_web::{post, put, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::domain::session::{payload_digest, MergeOutcome},
    models::dto::{
        request::{DictationQuery, SetAnswerRequest},
        response::{AnswerResponse, TranscriptionOutcomeResponse},
    },
};

/// Replace the typed answer at `index` (last write wins).
#[put("/api/sessions/{id}/answers/{index}")]
pub async fn set_answer(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
    request: web::Json<SetAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let (id, index) = path.into_inner();
    let handle = state.sessions.get(&id).await?;
    let mut session = handle.lock().await;

    session.ensure_round(request.round_token)?;
    session.set_answer(index, &request.text)?;

    Ok(HttpResponse::Ok().json(AnswerResponse {
        index,
        text: session.answers[index].text.clone(),
    }))
}

/// Transcribe a recording and append it to the answer at `index`. The
/// payload digest is checked first so a re-delivered recording is reported as
/// already consumed without paying for another transcription.
#[post("/api/sessions/{id}/answers/{index}/dictation")]
pub async fn transcribe_answer(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
    query: web::Query<DictationQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let (id, index) = path.into_inner();
    let handle = state.sessions.get(&id).await?;
    let mut session = handle.lock().await;

    session.ensure_round(query.round_token)?;

    let digest = payload_digest(&body);
    if session.already_transcribed(index, &digest)? {
        log::debug!(
            "session {}: recording for answer {index} already transcribed",
            session.id
        );
        return Ok(HttpResponse::Ok().json(TranscriptionOutcomeResponse {
            index,
            already_transcribed: true,
            merged: false,
            transcript: String::new(),
            answer: session.answers[index].text.clone(),
        }));
    }

    let transcript = state
        .transcriber
        .transcribe(&query.filename, body.to_vec())
        .await?;

    let outcome = session.merge_transcription(index, &transcript, &digest)?;
    if outcome == MergeOutcome::EmptyTranscript {
        log::warn!(
            "session {}: transcription of {} returned empty text",
            session.id,
            query.filename
        );
    }

    Ok(HttpResponse::Ok().json(TranscriptionOutcomeResponse {
        index,
        already_transcribed: outcome == MergeOutcome::AlreadyTranscribed,
        merged: outcome == MergeOutcome::Applied,
        transcript,
        answer: session.answers[index].text.clone(),
    }))
}
