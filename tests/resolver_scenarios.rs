// Cenários ponta a ponta dos três resolvers sobre um backend falso.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crm_access::backend::BackendError;
use crm_access::common::clock::ManualClock;
use crm_access::models::{Action, Module, RouteCategory};
use crm_access::services::access_context::{session_id_for, AccessContext};
use crm_access::services::classifier::DefaultErrorClassifier;
use crm_access::services::invalidation::InvalidationEvent;
use crm_access::services::ttl_cache::DEFAULT_TTL;
use crm_access::services::NavigationResolver;
use crm_access::store::{KeyValueStore, MemoryStore, AUTH_FLAG_KEY};
use crm_access::testing::{group_info, permissions_for, FakeCrmBackend};

const ALL_VIEW: [&str; 10] = [
    "Cliente_Visualizar",
    "Contrato_Visualizar",
    "Consultor_Visualizar",
    "Parceiro_Visualizar",
    "Boleto_Visualizar",
    "PessoaFisica_Visualizar",
    "PessoaJuridica_Visualizar",
    "Filial_Visualizar",
    "Usuario_Visualizar",
    "GrupoAcesso_Visualizar",
];

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-05-11T13:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

struct Session {
    backend: Arc<FakeCrmBackend>,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    ctx: AccessContext,
}

async fn open_session(backend: FakeCrmBackend) -> Session {
    let backend = Arc::new(backend);
    let store = Arc::new(MemoryStore::default());
    let clock = Arc::new(ManualClock::new(t0()));
    let ctx = AccessContext::open(
        session_id_for("token-cenarios"),
        backend.clone(),
        store.clone(),
        clock.clone(),
        Arc::new(DefaultErrorClassifier),
        DEFAULT_TTL,
    )
    .await;

    Session { backend, store, clock, ctx }
}

fn paths(routes: &[crm_access::models::RouteDescriptor]) -> Vec<&'static str> {
    routes.iter().map(|r| r.path).collect()
}

#[tokio::test]
async fn no_session_denies_everything_without_calling_the_backend() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for("Administrador", &ALL_VIEW));
    backend.set_group_info(group_info("Administrador", &["clientes", "contratos"], &[]));
    let session = open_session(backend).await;

    session.store.set(AUTH_FLAG_KEY, "false").await.unwrap();

    let permissions = session.ctx.permissions.get_user_permissions().await;
    assert!(permissions.has_no_permission);
    assert!(permissions.permissions.is_empty());
    assert!(session.ctx.navigation.get_available_routes().await.is_empty());
    assert_eq!(session.backend.calls("user-status"), 0);
}

#[tokio::test]
async fn partial_group_sees_only_the_intersection() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for(
        "Consultores",
        &["Cliente_Visualizar", "Contrato_Visualizar", "Usuario_Visualizar"],
    ));
    backend.set_group_info(group_info("Consultores", &["contratos", "clientes"], &[]));
    let session = open_session(backend).await;
    let navigation = &session.ctx.navigation;

    let routes = navigation.get_available_routes().await;

    assert_eq!(paths(&routes), vec!["/clientes", "/contratos"]);
    assert!(navigation.can_access_route("/contratos").await);
    assert!(!navigation.can_access_route("/usuarios").await);

    let grouped = navigation.get_grouped_routes().await;
    let categories: Vec<RouteCategory> = grouped.iter().map(|g| g.category).collect();
    assert_eq!(categories, vec![RouteCategory::Cadastros, RouteCategory::Gestao]);
}

#[tokio::test]
async fn hidden_screen_wins_over_allowed_screen() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for("Financeiro", &ALL_VIEW));
    backend.set_group_info(group_info(
        "Financeiro",
        &["boletos", "clientes", "usuarios"],
        &["usuarios"],
    ));
    let session = open_session(backend).await;

    let routes = session.ctx.navigation.get_available_routes().await;

    assert_eq!(paths(&routes), vec!["/clientes", "/boletos"]);
    assert!(session.ctx.group_access.is_screen_hidden("usuarios").await);
}

#[tokio::test]
async fn read_only_is_derived_from_missing_edit_permission() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for(
        "Gestor de Filial",
        &["Contrato_Visualizar", "Cliente_Visualizar", "Cliente_Editar"],
    ));
    let session = open_session(backend).await;
    let permissions = &session.ctx.permissions;

    assert!(permissions.is_read_only(Module::Contrato).await);
    assert!(!permissions.is_read_only(Module::Cliente).await);
    assert!(permissions.can_view(Module::Contrato).await);
    assert!(!permissions.can_edit(Module::Contrato).await);
    assert!(permissions.is_filial_only(Module::Contrato).await);
}

#[tokio::test]
async fn permission_cache_holds_for_the_whole_ttl() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for("Consultores", &["Cliente_Visualizar"]));
    let session = open_session(backend).await;
    let permissions = &session.ctx.permissions;

    permissions.get_user_permissions().await;
    session.clock.advance(TimeDelta::minutes(4) + TimeDelta::seconds(59));
    permissions.get_user_permissions().await;
    assert_eq!(session.backend.calls("user-status"), 1);

    session.clock.advance(TimeDelta::seconds(2));
    permissions.get_user_permissions().await;
    permissions.get_user_permissions().await;
    assert_eq!(session.backend.calls("user-status"), 2);
}

#[tokio::test]
async fn route_list_is_idempotent_inside_the_ttl() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for("Consultores", &ALL_VIEW));
    backend.set_group_info(group_info("Consultores", &["clientes", "pessoas"], &[]));
    let session = open_session(backend).await;
    let navigation = &session.ctx.navigation;

    let first = navigation.get_available_routes().await;
    session.clock.advance(TimeDelta::minutes(2));
    let second = navigation.get_available_routes().await;

    assert_eq!(first, second);
    assert_eq!(
        paths(&first),
        vec!["/clientes", "/pessoas-fisicas", "/pessoas-juridicas"]
    );
    assert_eq!(session.backend.calls("user-status"), 1);
    assert_eq!(session.backend.calls("user-info"), 1);
}

#[tokio::test]
async fn group_change_refetches_group_but_keeps_permissions_cached() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for("Consultores", &ALL_VIEW));
    backend.set_group_info(group_info("Consultores", &["clientes"], &[]));
    let session = open_session(backend).await;
    let navigation = &session.ctx.navigation;
    assert_eq!(paths(&navigation.get_available_routes().await), vec!["/clientes"]);

    session
        .backend
        .set_group_info(group_info("Consultores", &["clientes", "boletos"], &[]));
    session.ctx.publish(InvalidationEvent::GroupChanged).await;

    assert_eq!(
        paths(&navigation.get_available_routes().await),
        vec!["/clientes", "/boletos"]
    );
    assert_eq!(session.backend.calls("user-info"), 2);
    assert_eq!(session.backend.calls("user-status"), 1);
}

#[tokio::test]
async fn every_failure_mode_fails_closed() {
    let failures = [
        BackendError::Timeout("15s".to_string()),
        BackendError::Status { status: 500, code: None, message: "Internal Server Error".to_string() },
        BackendError::InvalidResponse("expected value at line 1".to_string()),
        BackendError::Status { status: 401, code: None, message: "Unauthorized".to_string() },
        BackendError::Status { status: 403, code: Some("PERMISSION_DENIED".to_string()), message: "Forbidden".to_string() },
    ];

    for failure in failures {
        let backend = FakeCrmBackend::new();
        backend.fail_user_status(failure.clone());
        backend.fail_group_info(failure.clone());
        backend.set_bool("can-access-module/Cliente", Err(failure.clone()));
        backend.set_bool("can-access/Contrato/7", Err(failure.clone()));
        let session = open_session(backend).await;
        let ctx = &session.ctx;

        assert!(ctx.permissions.get_user_permissions().await.has_no_permission, "{failure}");
        assert!(!ctx.permissions.has_permission(Module::Cliente, Action::Visualizar).await);
        assert!(!ctx.permissions.can_access_record(Module::Contrato, 7).await);
        assert!(!ctx.group_access.can_access_module(Module::Cliente).await);
        assert!(ctx.group_access.get_accessible_screens().await.is_empty());
        assert!(ctx.group_access.is_read_only().await);
        assert!(ctx.navigation.get_available_routes().await.is_empty());
        assert!(!ctx.navigation.can_access_route("/clientes").await);
    }
}

#[tokio::test]
async fn failed_composition_is_retried_on_next_call() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for("Consultores", &["Cliente_Visualizar"]));
    backend.fail_group_info(BackendError::Network("connection reset".to_string()));
    let session = open_session(backend).await;
    let navigation = &session.ctx.navigation;

    assert!(navigation.get_available_routes().await.is_empty());

    session.backend.set_group_info(group_info("Consultores", &["clientes"], &[]));
    assert_eq!(paths(&navigation.get_available_routes().await), vec!["/clientes"]);
}

#[tokio::test]
async fn refused_permission_fetch_is_not_cached_as_empty_routes() {
    let backend = FakeCrmBackend::new();
    backend.fail_user_status(BackendError::Status {
        status: 500,
        code: None,
        message: "Login failed for user 'crm_app'".to_string(),
    });
    backend.set_group_info(group_info("Consultores", &["clientes", "contratos"], &[]));
    let session = open_session(backend).await;
    let navigation = &session.ctx.navigation;

    assert!(navigation.get_available_routes().await.is_empty());

    session
        .backend
        .set_user_status(permissions_for("Consultores", &["Cliente_Visualizar"]));
    assert!(session.ctx.permissions.can_view(Module::Cliente).await);
    assert_eq!(paths(&navigation.get_available_routes().await), vec!["/clientes"]);
    assert_eq!(session.backend.calls("user-status"), 2);
}

#[tokio::test]
async fn breadcrumb_and_menus_follow_the_available_routes() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for("Administrador", &ALL_VIEW));
    backend.set_group_info(group_info(
        "Administrador",
        &["clientes", "contratos", "consultores", "parceiros", "boletos", "pessoas", "filiais", "usuarios"],
        &[],
    ));
    let session = open_session(backend).await;
    let navigation = &session.ctx.navigation;

    let menu = paths(&navigation.get_main_menu_routes().await);
    assert_eq!(&menu[..3], ["/clientes", "/contratos", "/boletos"]);
    assert_eq!(menu.last(), Some(&"/usuarios"));
    assert_eq!(navigation.get_mobile_menu_routes().await.len(), 6);

    let crumbs = navigation.get_breadcrumb("/boletos").await;
    assert_eq!(crumbs.len(), 2);
    assert_eq!(crumbs[0].path, "/");
    assert_eq!(crumbs[1].label, "Boletos");

    let missing = navigation.get_breadcrumb("/grupos-acesso").await;
    assert_eq!(missing.len(), 1);
    assert!(missing[0].not_found);

    assert!(NavigationResolver::is_route_active("/clientes/15/editar", "/clientes"));
    assert!(!NavigationResolver::is_route_active("/clientes-vip", "/clientes"));
}

#[tokio::test]
async fn logout_disarms_the_session_marker() {
    let backend = FakeCrmBackend::new();
    backend.set_user_status(permissions_for("Consultores", &["Cliente_Visualizar"]));
    let session = open_session(backend).await;
    assert!(session.ctx.permissions.can_view(Module::Cliente).await);

    session.ctx.logout().await;

    assert_eq!(
        session.store.get(AUTH_FLAG_KEY).await.unwrap().as_deref(),
        Some("false")
    );
    assert!(!session.ctx.permissions.can_view(Module::Cliente).await);
}
