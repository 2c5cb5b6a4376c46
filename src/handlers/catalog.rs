// src/handlers/catalog.rs

use axum::Json;

use crate::{
    common::error::{ApiError, AppError},
    middleware::{auth::CurrentSession, i18n::Locale},
    models::permission::{AccessGroup, PermissionDefinition},
};

// GET /api/catalog/groups (tela de administração de grupos)
#[utoipa::path(
    get,
    path = "/api/catalog/groups",
    tag = "Catalog",
    responses(
        (status = 200, description = "Grupos de acesso cadastrados", body = [AccessGroup]),
        (status = 502, description = "CRM indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_groups(
    session: CurrentSession,
    locale: Locale,
) -> Result<Json<Vec<AccessGroup>>, ApiError> {
    let groups = session
        .ctx
        .permissions
        .get_groups()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale))?;

    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/api/catalog/permissions",
    tag = "Catalog",
    responses(
        (status = 200, description = "Permissões que podem ser atribuídas", body = [PermissionDefinition]),
        (status = 502, description = "CRM indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_permissions(
    session: CurrentSession,
    locale: Locale,
) -> Result<Json<Vec<PermissionDefinition>>, ApiError> {
    let permissions = session
        .ctx
        .permissions
        .get_permission_catalog()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale))?;

    Ok(Json(permissions))
}
