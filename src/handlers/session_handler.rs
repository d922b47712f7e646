use actix_web::{delete, get, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::response::{SessionCreatedResponse, SessionSnapshot},
};

#[get("/api/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[post("/api/sessions")]
pub async fn create_session(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let handle = state.sessions.create().await?;
    let session = handle.lock().await;

    log::info!("created session {}", session.id);
    Ok(HttpResponse::Created().json(SessionCreatedResponse {
        session_id: session.id,
    }))
}

#[get("/api/sessions/{id}")]
pub async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let handle = state.sessions.get(&id).await?;
    let session = handle.lock().await;

    Ok(HttpResponse::Ok().json(SessionSnapshot::from_state(&session)))
}

#[delete("/api/sessions/{id}")]
pub async fn delete_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.sessions.remove(&id).await?;

    log::info!("deleted session {id}");
    Ok(HttpResponse::NoContent().finish())
}
