// src/handlers/navigation.rs

use axum::{
    extract::{Path, Query},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    handlers::{parse_action, parse_module, AllowedResponse},
    middleware::{auth::CurrentSession, i18n::Locale},
    models::{BreadcrumbItem, RouteDescriptor, RouteGroup},
};

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PathQuery {
    /// Caminho da tela no front-end, ex.: `/clientes/42/editar`.
    #[validate(length(min = 1, message = "O caminho não pode ser vazio."))]
    pub path: String,
}

impl PathQuery {
    fn validated(self, locale: &Locale) -> Result<String, ApiError> {
        self.validate()
            .map_err(|e| AppError::ValidationError(e).to_api_error(locale))?;
        Ok(self.path)
    }
}

#[utoipa::path(
    get,
    path = "/api/navigation/routes",
    tag = "Navigation",
    responses((status = 200, description = "Rotas visíveis para o usuário", body = [RouteDescriptor])),
    security(("api_jwt" = []))
)]
pub async fn list_routes(session: CurrentSession) -> Json<Vec<RouteDescriptor>> {
    Json(session.ctx.navigation.get_available_routes().await)
}

#[utoipa::path(
    get,
    path = "/api/navigation/grouped",
    tag = "Navigation",
    responses((status = 200, description = "Rotas agrupadas por categoria", body = [RouteGroup])),
    security(("api_jwt" = []))
)]
pub async fn list_grouped_routes(session: CurrentSession) -> Json<Vec<RouteGroup>> {
    Json(session.ctx.navigation.get_grouped_routes().await)
}

#[utoipa::path(
    get,
    path = "/api/navigation/menu",
    tag = "Navigation",
    responses((status = 200, description = "Menu principal em ordem de prioridade", body = [RouteDescriptor])),
    security(("api_jwt" = []))
)]
pub async fn main_menu(session: CurrentSession) -> Json<Vec<RouteDescriptor>> {
    Json(session.ctx.navigation.get_main_menu_routes().await)
}

#[utoipa::path(
    get,
    path = "/api/navigation/mobile-menu",
    tag = "Navigation",
    responses((status = 200, description = "Menu reduzido para telas pequenas", body = [RouteDescriptor])),
    security(("api_jwt" = []))
)]
pub async fn mobile_menu(session: CurrentSession) -> Json<Vec<RouteDescriptor>> {
    Json(session.ctx.navigation.get_mobile_menu_routes().await)
}

#[utoipa::path(
    get,
    path = "/api/navigation/breadcrumb",
    tag = "Navigation",
    params(PathQuery),
    responses(
        (status = 200, description = "Trilha até a tela", body = [BreadcrumbItem]),
        (status = 400, description = "Caminho vazio")
    ),
    security(("api_jwt" = []))
)]
pub async fn breadcrumb(
    session: CurrentSession,
    locale: Locale,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<BreadcrumbItem>>, ApiError> {
    let path = query.validated(&locale)?;
    Ok(Json(session.ctx.navigation.get_breadcrumb(&path).await))
}

#[utoipa::path(
    get,
    path = "/api/navigation/access",
    tag = "Navigation",
    params(PathQuery),
    responses((status = 200, description = "Se o usuário pode abrir a rota", body = AllowedResponse)),
    security(("api_jwt" = []))
)]
pub async fn route_access(
    session: CurrentSession,
    locale: Locale,
    Query(query): Query<PathQuery>,
) -> Result<Json<AllowedResponse>, ApiError> {
    let path = query.validated(&locale)?;
    let allowed = session.ctx.navigation.can_access_route(&path).await;
    Ok(Json(AllowedResponse { allowed }))
}

#[utoipa::path(
    get,
    path = "/api/navigation/related/{module}",
    tag = "Navigation",
    params(("module" = String, Path, description = "Módulo de referência")),
    responses((status = 200, description = "Rotas disponíveis do módulo", body = [RouteDescriptor])),
    security(("api_jwt" = []))
)]
pub async fn related_routes(
    session: CurrentSession,
    locale: Locale,
    Path(module): Path<String>,
) -> Result<Json<Vec<RouteDescriptor>>, ApiError> {
    let module = parse_module(&module, &locale)?;
    Ok(Json(session.ctx.navigation.get_related_routes(module).await))
}

#[utoipa::path(
    get,
    path = "/api/navigation/by-action/{action}",
    tag = "Navigation",
    params(("action" = String, Path, description = "Ação exigida, ex.: Incluir")),
    responses((status = 200, description = "Rotas onde o usuário pode executar a ação", body = [RouteDescriptor])),
    security(("api_jwt" = []))
)]
pub async fn routes_by_action(
    session: CurrentSession,
    locale: Locale,
    Path(action): Path<String>,
) -> Result<Json<Vec<RouteDescriptor>>, ApiError> {
    let action = parse_action(&action, &locale)?;
    Ok(Json(session.ctx.navigation.get_routes_by_action(action).await))
}
