// src/handlers/me.rs

use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::ApiError,
    handlers::{parse_action, parse_module, AllowedResponse},
    middleware::{auth::CurrentSession, i18n::Locale},
    models::{GroupAccessInfo, Module, UserPermissions},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PermissionCheckQuery {
    /// Pergunta direto ao CRM em vez de usar o conjunto em cache.
    #[serde(default)]
    pub remote: bool,
}

// Resumo das permissões do usuário sobre um módulo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleAccess {
    pub module: Module,
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub is_read_only: bool,
    pub is_filial_only: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupProfile {
    #[serde(flatten)]
    pub info: GroupAccessInfo,
    #[schema(value_type = Vec<String>)]
    pub accessible_screens: BTreeSet<String>,
    pub is_admin: bool,
    pub is_consultor: bool,
    pub is_gestor_filial: bool,
    pub is_administrativo_filial: bool,
    pub is_financeiro: bool,
    pub is_faturamento: bool,
    pub has_valid_group: bool,
}

#[utoipa::path(
    get,
    path = "/api/me/permissions",
    tag = "Permissions",
    responses(
        (status = 200, description = "Permissões efetivas do usuário", body = UserPermissions),
        (status = 401, description = "Token ausente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_permissions(session: CurrentSession) -> Json<UserPermissions> {
    Json(session.ctx.permissions.get_user_permissions().await)
}

#[utoipa::path(
    get,
    path = "/api/me/permissions/{module}/{action}",
    tag = "Permissions",
    params(
        ("module" = String, Path, description = "Módulo, ex.: Cliente"),
        ("action" = String, Path, description = "Ação, ex.: Visualizar"),
        PermissionCheckQuery
    ),
    responses(
        (status = 200, description = "Resultado da checagem", body = AllowedResponse),
        (status = 400, description = "Módulo ou ação inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_permission(
    session: CurrentSession,
    locale: Locale,
    Path((module, action)): Path<(String, String)>,
    Query(query): Query<PermissionCheckQuery>,
) -> Result<Json<AllowedResponse>, ApiError> {
    let module = parse_module(&module, &locale)?;
    let action = parse_action(&action, &locale)?;

    let permissions = &session.ctx.permissions;
    let allowed = if query.remote {
        permissions.check_permission_remote(module, action).await
    } else {
        permissions.has_permission(module, action).await
    };

    Ok(Json(AllowedResponse { allowed }))
}

#[utoipa::path(
    get,
    path = "/api/me/modules/{module}",
    tag = "Permissions",
    params(("module" = String, Path, description = "Módulo, ex.: Contrato")),
    responses(
        (status = 200, description = "Capacidades do usuário no módulo", body = ModuleAccess),
        (status = 400, description = "Módulo inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_module_access(
    session: CurrentSession,
    locale: Locale,
    Path(module): Path<String>,
) -> Result<Json<ModuleAccess>, ApiError> {
    let module = parse_module(&module, &locale)?;
    let permissions = &session.ctx.permissions;

    Ok(Json(ModuleAccess {
        module,
        can_view: permissions.can_view(module).await,
        can_create: permissions.can_create(module).await,
        can_edit: permissions.can_edit(module).await,
        can_delete: permissions.can_delete(module).await,
        is_read_only: permissions.is_read_only(module).await,
        is_filial_only: permissions.is_filial_only(module).await,
    }))
}

#[utoipa::path(
    get,
    path = "/api/me/records/{module}/{record_id}",
    tag = "Permissions",
    params(
        ("module" = String, Path, description = "Módulo do registro"),
        ("record_id" = i64, Path, description = "ID do registro no CRM")
    ),
    responses(
        (status = 200, description = "Se o usuário pode abrir o registro", body = AllowedResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn check_record_access(
    session: CurrentSession,
    locale: Locale,
    Path((module, record_id)): Path<(String, i64)>,
) -> Result<Json<AllowedResponse>, ApiError> {
    let module = parse_module(&module, &locale)?;
    let allowed = session.ctx.permissions.can_access_record(module, record_id).await;
    Ok(Json(AllowedResponse { allowed }))
}

#[utoipa::path(
    get,
    path = "/api/me/group",
    tag = "Group Access",
    responses(
        (status = 200, description = "Grupo de acesso e restrições", body = GroupProfile)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_group_profile(session: CurrentSession) -> Json<GroupProfile> {
    let group = &session.ctx.group_access;
    let info = group.get_group_access_info().await;

    Json(GroupProfile {
        accessible_screens: info.accessible_screens(),
        is_admin: group.is_admin().await,
        is_consultor: group.is_consultor().await,
        is_gestor_filial: group.is_gestor_filial().await,
        is_administrativo_filial: group.is_administrativo_filial().await,
        is_financeiro: group.is_financeiro().await,
        is_faturamento: group.is_faturamento().await,
        has_valid_group: group.has_valid_group().await,
        info,
    })
}
