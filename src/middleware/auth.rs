// src/middleware/auth.rs

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    services::AccessContext,
};

/// Sessão resolvida pelo `session_guard` para a requisição atual.
#[derive(Clone)]
pub struct CurrentSession {
    pub token: String,
    pub ctx: Arc<AccessContext>,
}

// Token do cabeçalho "Authorization: Bearer <token>". Vazio conta como ausente.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// O middleware em si: sem token não há sessão, e sem sessão tudo é negado
pub async fn session_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthenticated.to_api_error(&locale))?;

    let ctx = app_state.sessions.context_for(&token).await;
    request.extensions_mut().insert(CurrentSession { token, ctx });

    Ok(next.run(request).await)
}

// Extrator para obter a sessão diretamente nos handlers
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<CurrentSession>() {
            return Ok(session.clone());
        }
        let Ok(locale) = Locale::from_request_parts(parts, state).await;
        Err(AppError::Unauthenticated.to_api_error(&locale))
    }
}
