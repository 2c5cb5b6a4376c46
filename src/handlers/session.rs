// src/handlers/session.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentSession, i18n::Locale},
    services::invalidation::InvalidationEvent,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvalidateRequest {
    #[schema(example = "permissions-changed")]
    pub event: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotifiedResponse {
    /// Quantos caches reagiram ao evento.
    pub notified: usize,
}

#[utoipa::path(
    post,
    path = "/api/session/invalidate",
    tag = "Session",
    request_body = InvalidateRequest,
    responses(
        (status = 200, description = "Evento distribuído aos caches", body = NotifiedResponse),
        (status = 400, description = "Evento desconhecido")
    ),
    security(("api_jwt" = []))
)]
pub async fn invalidate(
    State(app_state): State<AppState>,
    session: CurrentSession,
    locale: Locale,
    Json(payload): Json<InvalidateRequest>,
) -> Result<Json<NotifiedResponse>, ApiError> {
    let event: InvalidationEvent = payload
        .event
        .parse()
        .map_err(|e| AppError::InvalidEvent(e).to_api_error(&locale))?;

    tracing::info!("Evento '{}' na sessão {}", event, session.ctx.session_id);

    // Logout pelo barramento é o mesmo logout da rota dedicada
    let notified = match event {
        InvalidationEvent::Logout => app_state.sessions.logout(&session.token).await,
        other => session.ctx.publish(other).await,
    };

    Ok(Json(NotifiedResponse { notified }))
}

#[utoipa::path(
    post,
    path = "/api/session/logout",
    tag = "Session",
    responses((status = 204, description = "Sessão encerrada e caches limpos")),
    security(("api_jwt" = []))
)]
pub async fn logout(State(app_state): State<AppState>, session: CurrentSession) -> StatusCode {
    app_state.sessions.logout(&session.token).await;
    StatusCode::NO_CONTENT
}
