use actix_web::{post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{request::DocumentUploadQuery, response::DocumentIngestedResponse},
};

/// Raw-bytes upload; the filename travels as a query parameter so no
/// multipart machinery is needed for a single file.
#[post("/api/sessions/{id}/document")]
pub async fn upload_document(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    query: web::Query<DocumentUploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let handle = state.sessions.get(&id).await?;
    let mut session = handle.lock().await;

    let outcome = state.documents.ingest(&mut session, &query.filename, &body)?;

    Ok(HttpResponse::Ok().json(DocumentIngestedResponse {
        filename: query.filename.trim().to_string(),
        characters: outcome.characters,
        cached: outcome.cached,
        extracted_empty: outcome.extracted_empty,
    }))
}
