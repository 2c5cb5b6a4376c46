// src/testing.rs
//
// Backend falso e construtores de payload para testes dos resolvers
// (unitários e de integração).

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{BackendError, GroupAccessBackend, PermissionBackend};
use crate::models::group_access::GroupAccessInfo;
use crate::models::permission::{AccessGroup, Action, Module, PermissionDefinition, UserPermissions};

/// Monta um `user-status` bem-sucedido.
pub fn permissions_for(group: &str, permissions: &[&str]) -> UserPermissions {
    UserPermissions {
        user_id: 42,
        display_name: "Maria Souza".to_string(),
        login: "maria.souza".to_string(),
        group_name: group.to_string(),
        branch_name: Some("Matriz".to_string()),
        has_no_permission: false,
        message: None,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

/// Monta um `user-info` com as telas liberadas e ocultas.
pub fn group_info(group: &str, allowed_screens: &[&str], hidden_screens: &[&str]) -> GroupAccessInfo {
    GroupAccessInfo {
        group_id: 9,
        group_name: group.to_string(),
        description: format!("Grupo {group}"),
        allowed_modules: BTreeSet::new(),
        hidden_modules: BTreeSet::new(),
        allowed_screens: allowed_screens.iter().map(|s| s.to_string()).collect(),
        hidden_screens: hidden_screens.iter().map(|s| s.to_string()).collect(),
        branch_restricted: false,
        read_only: false,
        hide_users_tab: false,
    }
}

fn not_configured(endpoint: &str) -> BackendError {
    BackendError::Network(format!("sem resposta configurada para {endpoint}"))
}

/// Backend roteirizável: cada endpoint devolve o que foi configurado e conta
/// as chamadas. Endpoint sem configuração responde com erro de rede.
pub struct FakeCrmBackend {
    user_status: Mutex<Result<UserPermissions, BackendError>>,
    user_info: Mutex<Result<GroupAccessInfo, BackendError>>,
    accessible_modules: Mutex<Result<BTreeSet<String>, BackendError>>,
    accessible_screens: Mutex<Result<BTreeSet<String>, BackendError>>,
    groups: Mutex<Result<Vec<AccessGroup>, BackendError>>,
    permission_catalog: Mutex<Result<Vec<PermissionDefinition>, BackendError>>,
    booleans: Mutex<HashMap<String, Result<bool, BackendError>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl Default for FakeCrmBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCrmBackend {
    pub fn new() -> Self {
        Self {
            user_status: Mutex::new(Err(not_configured("user-status"))),
            user_info: Mutex::new(Err(not_configured("user-info"))),
            accessible_modules: Mutex::new(Err(not_configured("accessible-modules"))),
            accessible_screens: Mutex::new(Err(not_configured("accessible-screens"))),
            groups: Mutex::new(Err(not_configured("grupos"))),
            permission_catalog: Mutex::new(Err(not_configured("permissoes"))),
            booleans: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_user_status(&self, permissions: UserPermissions) {
        *self.user_status.lock().unwrap_or_else(|e| e.into_inner()) = Ok(permissions);
    }

    pub fn fail_user_status(&self, error: BackendError) {
        *self.user_status.lock().unwrap_or_else(|e| e.into_inner()) = Err(error);
    }

    pub fn set_group_info(&self, info: GroupAccessInfo) {
        *self.user_info.lock().unwrap_or_else(|e| e.into_inner()) = Ok(info);
    }

    pub fn fail_group_info(&self, error: BackendError) {
        *self.user_info.lock().unwrap_or_else(|e| e.into_inner()) = Err(error);
    }

    pub fn set_accessible_modules(&self, modules: Result<BTreeSet<String>, BackendError>) {
        *self.accessible_modules.lock().unwrap_or_else(|e| e.into_inner()) = modules;
    }

    pub fn set_accessible_screens(&self, screens: Result<BTreeSet<String>, BackendError>) {
        *self.accessible_screens.lock().unwrap_or_else(|e| e.into_inner()) = screens;
    }

    pub fn set_groups(&self, groups: Result<Vec<AccessGroup>, BackendError>) {
        *self.groups.lock().unwrap_or_else(|e| e.into_inner()) = groups;
    }

    pub fn set_permission_catalog(&self, catalog: Result<Vec<PermissionDefinition>, BackendError>) {
        *self.permission_catalog.lock().unwrap_or_else(|e| e.into_inner()) = catalog;
    }

    /// `key` segue o caminho do endpoint sem o prefixo do controller,
    /// ex.: `"can-access-module/Cliente"`, `"can-access/Contrato/10"`.
    pub fn set_bool(&self, key: &str, result: Result<bool, BackendError>) {
        self.booleans
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), result);
    }

    /// Quantas vezes o endpoint (`"user-status"`, `"can-access-module"`...) foi chamado.
    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, endpoint: &str) {
        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    fn boolean(&self, endpoint: &str, key: String) -> Result<bool, BackendError> {
        self.record(endpoint);
        self.booleans
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(not_configured(&key)))
    }
}

#[async_trait]
impl PermissionBackend for FakeCrmBackend {
    async fn user_status(&self) -> Result<UserPermissions, BackendError> {
        self.record("user-status");
        self.user_status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn check_permission(&self, module: Module, action: Action) -> Result<bool, BackendError> {
        self.boolean("check-permission", format!("check-permission/{module}/{action}"))
    }

    async fn can_access_record(&self, module: Module, record_id: i64) -> Result<bool, BackendError> {
        self.boolean("can-access", format!("can-access/{module}/{record_id}"))
    }

    async fn list_groups(&self) -> Result<Vec<AccessGroup>, BackendError> {
        self.record("grupos");
        self.groups.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn list_permissions(&self) -> Result<Vec<PermissionDefinition>, BackendError> {
        self.record("permissoes");
        self.permission_catalog.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl GroupAccessBackend for FakeCrmBackend {
    async fn user_info(&self) -> Result<GroupAccessInfo, BackendError> {
        self.record("user-info");
        self.user_info.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn can_access_module(&self, module: Module) -> Result<bool, BackendError> {
        self.boolean("can-access-module", format!("can-access-module/{module}"))
    }

    async fn can_access_screen(&self, screen: &str) -> Result<bool, BackendError> {
        self.boolean("can-access-screen", format!("can-access-screen/{screen}"))
    }

    async fn is_module_hidden(&self, module: Module) -> Result<bool, BackendError> {
        self.boolean("is-module-hidden", format!("is-module-hidden/{module}"))
    }

    async fn accessible_modules(&self) -> Result<BTreeSet<String>, BackendError> {
        self.record("accessible-modules");
        self.accessible_modules.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn accessible_screens(&self) -> Result<BTreeSet<String>, BackendError> {
        self.record("accessible-screens");
        self.accessible_screens.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
