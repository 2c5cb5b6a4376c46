// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services::invalidation::InvalidationEvent;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health_check,

        // --- Permissions ---
        handlers::me::get_permissions,
        handlers::me::check_permission,
        handlers::me::get_module_access,
        handlers::me::check_record_access,

        // --- Group Access ---
        handlers::me::get_group_profile,

        // --- Navigation ---
        handlers::navigation::list_routes,
        handlers::navigation::list_grouped_routes,
        handlers::navigation::main_menu,
        handlers::navigation::mobile_menu,
        handlers::navigation::breadcrumb,
        handlers::navigation::route_access,
        handlers::navigation::related_routes,
        handlers::navigation::routes_by_action,

        // --- Catalog ---
        handlers::catalog::list_groups,
        handlers::catalog::list_permissions,

        // --- Session ---
        handlers::session::invalidate,
        handlers::session::logout,
    ),
    components(
        schemas(
            // --- Permissions ---
            models::Module,
            models::Action,
            models::UserPermissions,
            models::permission::AccessGroup,
            models::permission::PermissionDefinition,
            handlers::AllowedResponse,
            handlers::me::ModuleAccess,

            // --- Group Access ---
            models::GroupAccessInfo,
            handlers::me::GroupProfile,

            // --- Navigation ---
            models::RouteDescriptor,
            models::RouteCategory,
            models::RouteGroup,
            models::BreadcrumbItem,

            // --- Session ---
            InvalidationEvent,
            handlers::session::InvalidateRequest,
            handlers::session::NotifiedResponse,
            handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "Health", description = "Estado do serviço"),
        (name = "Permissions", description = "Permissões do usuário por módulo e ação"),
        (name = "Group Access", description = "Grupo de acesso e restrições de tela"),
        (name = "Navigation", description = "Rotas, menus e breadcrumbs permitidos"),
        (name = "Catalog", description = "Grupos e permissões cadastrados no CRM"),
        (name = "Session", description = "Invalidação de caches e logout")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
