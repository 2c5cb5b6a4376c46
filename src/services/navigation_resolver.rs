// src/services/navigation_resolver.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;

use crate::{
    backend::BackendError,
    catalog::{category_for, menu_priority, screen_for, MOBILE_MENU_LIMIT, ROUTE_CATALOG},
    common::clock::Clock,
    models::navigation::{BreadcrumbItem, RouteCategory, RouteDescriptor, RouteGroup},
    models::permission::{Action, Module},
    services::group_access_resolver::GroupAccessResolver,
    services::invalidation::{CacheSubscriber, InvalidationEvent},
    services::permission_resolver::PermissionResolver,
    services::ttl_cache::TtlSlot,
};

/// Lista autoritativa de rotas navegáveis: permissão ∩ tela visível do grupo.
pub struct NavigationResolver {
    permissions: Arc<PermissionResolver>,
    group_access: Arc<GroupAccessResolver>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    routes: TtlSlot<Vec<RouteDescriptor>>,
}

impl NavigationResolver {
    pub fn new(
        permissions: Arc<PermissionResolver>,
        group_access: Arc<GroupAccessResolver>,
        clock: Arc<dyn Clock>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            permissions,
            group_access,
            clock,
            ttl,
            routes: TtlSlot::new(),
        }
    }

    pub async fn get_available_routes(&self) -> Vec<RouteDescriptor> {
        if let Some(cached) = self.routes.get(self.clock.now()) {
            return cached;
        }

        match self.compose().await {
            Ok(routes) => {
                self.routes.put(routes.clone(), self.clock.now(), self.ttl);
                routes
            }
            Err(e) => {
                // Composição incompleta nunca vira "mostra tudo" nem vai para o cache
                tracing::error!("🔥 Não foi possível montar as rotas disponíveis: {}", e);
                Vec::new()
            }
        }
    }

    // A ordem importa: permissões -> telas do grupo -> interseção
    async fn compose(&self) -> Result<Vec<RouteDescriptor>, BackendError> {
        // 1. Candidatas pela camada de permissões
        let permissions = self.permissions.resolve_user_permissions().await?;
        let candidates: Vec<RouteDescriptor> = ROUTE_CATALOG
            .iter()
            .filter(|route| permissions.grants(route.module, route.action))
            .copied()
            .collect();

        // 2. Telas visíveis para o grupo
        let accessible = self
            .group_access
            .resolve_group_access_info()
            .await?
            .accessible_screens();

        // 3. Interseção pelo mapa módulo -> tela
        let routes: Vec<RouteDescriptor> = candidates
            .into_iter()
            .filter(|route| accessible.contains(screen_for(route.module)))
            .collect();

        tracing::debug!("{} rota(s) disponíveis para o usuário", routes.len());
        Ok(routes)
    }

    pub async fn can_access_route(&self, path: &str) -> bool {
        self.get_available_routes()
            .await
            .iter()
            .any(|route| route.path == path)
    }

    /// Agrupa por categoria, na ordem fixa. Categoria vazia não aparece.
    pub async fn get_grouped_routes(&self) -> Vec<RouteGroup> {
        let routes = self.get_available_routes().await;

        RouteCategory::ORDER
            .into_iter()
            .filter_map(|category| {
                let members: Vec<RouteDescriptor> = routes
                    .iter()
                    .filter(|route| category_for(route.module) == category)
                    .copied()
                    .collect();
                (!members.is_empty()).then(|| RouteGroup {
                    category,
                    label: category.label(),
                    routes: members,
                })
            })
            .collect()
    }

    pub async fn get_main_menu_routes(&self) -> Vec<RouteDescriptor> {
        let mut routes = self.get_available_routes().await;
        // sort_by_key é estável: sem prioridade ficam no fim, na ordem do catálogo
        routes.sort_by_key(|route| menu_priority(route.module).unwrap_or(u8::MAX));
        routes
    }

    pub async fn get_mobile_menu_routes(&self) -> Vec<RouteDescriptor> {
        let mut routes = self.get_main_menu_routes().await;
        routes.truncate(MOBILE_MENU_LIMIT);
        routes
    }

    pub async fn get_breadcrumb(&self, path: &str) -> Vec<BreadcrumbItem> {
        let routes = self.get_available_routes().await;
        match routes.iter().find(|route| route.path == path) {
            Some(route) => vec![BreadcrumbItem::home(), BreadcrumbItem::from(route)],
            None => vec![BreadcrumbItem::not_found(path)],
        }
    }

    pub async fn get_related_routes(&self, module: Module) -> Vec<RouteDescriptor> {
        self.get_available_routes()
            .await
            .into_iter()
            .filter(|route| route.module == module)
            .collect()
    }

    pub async fn get_routes_by_action(&self, action: Action) -> Vec<RouteDescriptor> {
        self.get_available_routes()
            .await
            .into_iter()
            .filter(|route| route.action == action)
            .collect()
    }

    /// Igualdade exata ou rota-filha (`/clientes/15` ativa `/clientes`).
    pub fn is_route_active(current_path: &str, route_path: &str) -> bool {
        current_path == route_path
            || current_path
                .strip_prefix(route_path)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Limpa as rotas e, em cascata, o cache do grupo. O cache de permissões
    /// não é tocado.
    pub fn invalidate_cache(&self) {
        self.routes.clear();
        self.group_access.invalidate_cache();
    }
}

#[async_trait]
impl CacheSubscriber for NavigationResolver {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn reacts_to(&self) -> &'static [InvalidationEvent] {
        &[
            InvalidationEvent::Logout,
            InvalidationEvent::PermissionsChanged,
            InvalidationEvent::GroupChanged,
        ]
    }

    async fn invalidate(&self) {
        self.invalidate_cache();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::common::clock::ManualClock;
    use crate::services::classifier::DefaultErrorClassifier;
    use crate::services::ttl_cache::DEFAULT_TTL;
    use crate::store::{KeyValueStore, MemoryStore, AUTH_FLAG_KEY};
    use crate::testing::{group_info, permissions_for, FakeCrmBackend};

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    struct Fixture {
        backend: Arc<FakeCrmBackend>,
        clock: Arc<ManualClock>,
        permissions: Arc<PermissionResolver>,
        group_access: Arc<GroupAccessResolver>,
        navigation: NavigationResolver,
    }

    async fn fixture(perms: &[&str], allowed: &[&str], hidden: &[&str]) -> Fixture {
        let backend = Arc::new(FakeCrmBackend::new());
        backend.set_user_status(permissions_for("Consultores", perms));
        backend.set_group_info(group_info("Consultores", allowed, hidden));
        let store = Arc::new(MemoryStore::default());
        store.set(AUTH_FLAG_KEY, "true").await.unwrap();
        let clock = Arc::new(ManualClock::new(t0()));
        let classifier = Arc::new(DefaultErrorClassifier);

        let permissions = Arc::new(PermissionResolver::new(
            backend.clone(),
            store,
            clock.clone(),
            classifier.clone(),
            DEFAULT_TTL,
        ));
        let group_access = Arc::new(GroupAccessResolver::new(
            backend.clone(),
            clock.clone(),
            classifier,
            DEFAULT_TTL,
        ));
        let navigation = NavigationResolver::new(
            permissions.clone(),
            group_access.clone(),
            clock.clone(),
            DEFAULT_TTL,
        );

        Fixture { backend, clock, permissions, group_access, navigation }
    }

    fn paths(routes: &[RouteDescriptor]) -> Vec<&'static str> {
        routes.iter().map(|r| r.path).collect()
    }

    const ALL_VIEW: [&str; 10] = [
        "Cliente_Visualizar",
        "Contrato_Visualizar",
        "Consultor_Visualizar",
        "Parceiro_Visualizar",
        "Boleto_Visualizar",
        "Usuario_Visualizar",
        "Filial_Visualizar",
        "GrupoAcesso_Visualizar",
        "PessoaFisica_Visualizar",
        "PessoaJuridica_Visualizar",
    ];

    const ALL_SCREENS: [&str; 9] = [
        "clientes",
        "contratos",
        "consultores",
        "parceiros",
        "boletos",
        "usuarios",
        "filiais",
        "grupos-acesso",
        "pessoas",
    ];

    #[tokio::test]
    async fn intersection_keeps_only_routes_allowed_by_both_layers() {
        let f = fixture(
            &["Cliente_Visualizar", "Contrato_Visualizar", "Boleto_Visualizar"],
            &["clientes", "boletos", "filiais"],
            &[],
        )
        .await;

        let routes = f.navigation.get_available_routes().await;

        assert_eq!(paths(&routes), vec!["/clientes", "/boletos"]);
    }

    #[tokio::test]
    async fn edit_permission_alone_does_not_expose_a_route() {
        let f = fixture(&["Contrato_Editar"], &["contratos"], &[]).await;

        assert!(f.navigation.get_available_routes().await.is_empty());
    }

    #[tokio::test]
    async fn hidden_screen_removes_route_even_if_allowed() {
        let f = fixture(
            &["Cliente_Visualizar", "Usuario_Visualizar"],
            &["clientes", "usuarios"],
            &["usuarios"],
        )
        .await;

        assert_eq!(paths(&f.navigation.get_available_routes().await), vec!["/clientes"]);
        assert!(!f.navigation.can_access_route("/usuarios").await);
        assert!(f.navigation.can_access_route("/clientes").await);
        assert!(!f.navigation.can_access_route("/clientes/").await);
    }

    #[tokio::test]
    async fn repeated_calls_within_ttl_are_identical_and_cached() {
        let f = fixture(&ALL_VIEW, &ALL_SCREENS, &[]).await;

        let first = f.navigation.get_available_routes().await;
        f.clock.advance(TimeDelta::minutes(4));
        let second = f.navigation.get_available_routes().await;

        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        assert_eq!(f.backend.calls("user-status"), 1);
        assert_eq!(f.backend.calls("user-info"), 1);
    }

    #[tokio::test]
    async fn permission_backend_outage_yields_empty_and_is_not_cached() {
        let f = fixture(&ALL_VIEW, &ALL_SCREENS, &[]).await;
        f.backend.fail_user_status(BackendError::Status {
            status: 500,
            code: None,
            message: "Internal Server Error".into(),
        });

        assert!(f.navigation.get_available_routes().await.is_empty());

        f.backend.set_user_status(permissions_for("Consultores", &ALL_VIEW));
        assert_eq!(f.navigation.get_available_routes().await.len(), 10);
    }

    #[tokio::test]
    async fn group_backend_outage_yields_empty() {
        let f = fixture(&ALL_VIEW, &ALL_SCREENS, &[]).await;
        f.backend.fail_group_info(BackendError::Timeout("15s".into()));

        assert!(f.navigation.get_available_routes().await.is_empty());
        assert!(f.navigation.get_grouped_routes().await.is_empty());
        assert_eq!(f.navigation.get_breadcrumb("/clientes").await.len(), 1);
    }

    #[tokio::test]
    async fn invalidation_cascades_to_group_but_not_to_permissions() {
        let f = fixture(&ALL_VIEW, &ALL_SCREENS, &[]).await;
        f.navigation.get_available_routes().await;

        f.navigation.invalidate_cache();

        f.group_access.get_group_access_info().await;
        f.permissions.get_user_permissions().await;
        assert_eq!(f.backend.calls("user-info"), 2);
        assert_eq!(f.backend.calls("user-status"), 1);
    }

    #[tokio::test]
    async fn grouped_routes_skip_empty_categories() {
        let f = fixture(
            &["Cliente_Visualizar", "Boleto_Visualizar", "Parceiro_Visualizar"],
            &ALL_SCREENS,
            &[],
        )
        .await;

        let groups = f.navigation.get_grouped_routes().await;

        let categories: Vec<RouteCategory> = groups.iter().map(|g| g.category).collect();
        assert_eq!(categories, vec![RouteCategory::Cadastros, RouteCategory::Financeiro]);
        assert_eq!(paths(&groups[0].routes), vec!["/clientes", "/parceiros"]);
        assert_eq!(groups[1].label, "Financeiro");
    }

    #[tokio::test]
    async fn menus_follow_priority_and_mobile_is_truncated() {
        let f = fixture(&ALL_VIEW, &ALL_SCREENS, &[]).await;

        let main = f.navigation.get_main_menu_routes().await;
        assert_eq!(
            paths(&main),
            vec![
                "/clientes",
                "/contratos",
                "/boletos",
                "/consultores",
                "/parceiros",
                "/pessoas-fisicas",
                "/pessoas-juridicas",
                "/filiais",
                "/usuarios",
                "/grupos-acesso",
            ]
        );

        let mobile = f.navigation.get_mobile_menu_routes().await;
        assert_eq!(mobile.len(), MOBILE_MENU_LIMIT);
        assert_eq!(paths(&mobile), paths(&main[..MOBILE_MENU_LIMIT]));
    }

    #[tokio::test]
    async fn breadcrumb_for_known_and_unknown_paths() {
        let f = fixture(&["Contrato_Visualizar"], &["contratos"], &[]).await;

        let found = f.navigation.get_breadcrumb("/contratos").await;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], BreadcrumbItem::home());
        assert_eq!(found[1].label, "Contratos");

        let missing = f.navigation.get_breadcrumb("/boletos").await;
        assert_eq!(missing, vec![BreadcrumbItem::not_found("/boletos")]);
        assert!(missing[0].not_found);
    }

    #[tokio::test]
    async fn related_and_by_action_filters() {
        let f = fixture(&["Contrato_Visualizar", "Cliente_Visualizar"], &ALL_SCREENS, &[]).await;

        assert_eq!(paths(&f.navigation.get_related_routes(Module::Contrato).await), vec!["/contratos"]);
        assert!(f.navigation.get_related_routes(Module::Boleto).await.is_empty());
        assert_eq!(f.navigation.get_routes_by_action(Action::Visualizar).await.len(), 2);
        assert!(f.navigation.get_routes_by_action(Action::Excluir).await.is_empty());
    }

    #[test]
    fn route_activity_matches_exact_and_nested_paths() {
        assert!(NavigationResolver::is_route_active("/clientes", "/clientes"));
        assert!(NavigationResolver::is_route_active("/clientes/15/editar", "/clientes"));
        assert!(!NavigationResolver::is_route_active("/clientes-inativos", "/clientes"));
        assert!(!NavigationResolver::is_route_active("/contratos", "/clientes"));
    }
}
