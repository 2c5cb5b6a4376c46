// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::session_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Permissões e grupo do usuário logado
    let me_routes = Router::new()
        .route("/permissions", get(handlers::me::get_permissions))
        .route(
            "/permissions/{module}/{action}",
            get(handlers::me::check_permission),
        )
        .route("/modules/{module}", get(handlers::me::get_module_access))
        .route(
            "/records/{module}/{record_id}",
            get(handlers::me::check_record_access),
        )
        .route("/group", get(handlers::me::get_group_profile));

    let navigation_routes = Router::new()
        .route("/routes", get(handlers::navigation::list_routes))
        .route("/grouped", get(handlers::navigation::list_grouped_routes))
        .route("/menu", get(handlers::navigation::main_menu))
        .route("/mobile-menu", get(handlers::navigation::mobile_menu))
        .route("/breadcrumb", get(handlers::navigation::breadcrumb))
        .route("/access", get(handlers::navigation::route_access))
        .route("/related/{module}", get(handlers::navigation::related_routes))
        .route("/by-action/{action}", get(handlers::navigation::routes_by_action));

    let catalog_routes = Router::new()
        .route("/groups", get(handlers::catalog::list_groups))
        .route("/permissions", get(handlers::catalog::list_permissions));

    let session_routes = Router::new()
        .route("/invalidate", post(handlers::session::invalidate))
        .route("/logout", post(handlers::session::logout));

    // Tudo abaixo exige "Authorization: Bearer"
    let protected = Router::new()
        .nest("/me", me_routes)
        .nest("/navigation", navigation_routes)
        .nest("/catalog", catalog_routes)
        .nest("/session", session_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_guard,
        ));

    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
