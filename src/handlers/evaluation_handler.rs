use actix_web::{post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::response::EvaluationReport,
};

/// Grade every answer of the active set in one batched model call. On
/// failure the previous report, if any, stays in place for the snapshot to
/// serve (marked stale once answers change).
#[post("/api/sessions/{id}/evaluation")]
pub async fn evaluate_answers(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let handle = state.sessions.get(&id).await?;
    let mut session = handle.lock().await;

    let questions = match &session.active_set {
        Some(set) => set.questions.clone(),
        None => return Err(AppError::NothingToEvaluate),
    };

    session.begin_evaluation()?;
    let answers = session.answers_text();

    match state.evaluator.evaluate(&questions, &answers).await {
        Ok(evaluations) => {
            session.commit_evaluations(evaluations);
            let report = EvaluationReport::from_state(&session).ok_or_else(|| {
                AppError::InternalError("evaluation report missing after commit".to_string())
            })?;
            Ok(HttpResponse::Ok().json(report))
        }
        Err(err) => {
            log::warn!("session {}: evaluation failed: {err}", session.id);
            session.abort_evaluation();
            Err(err)
        }
    }
}
