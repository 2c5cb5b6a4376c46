// src/services/group_access_resolver.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;

use crate::{
    backend::{BackendError, GroupAccessBackend},
    common::clock::Clock,
    models::group_access::{
        GroupAccessInfo, GRUPO_ADMINISTRADOR, GRUPO_ADMINISTRATIVO_FILIAL, GRUPO_CONSULTORES,
        GRUPO_FATURAMENTO, GRUPO_FINANCEIRO, GRUPO_GESTOR_FILIAL, GRUPO_USUARIO,
    },
    models::permission::Module,
    services::classifier::ErrorClassifier,
    services::invalidation::{CacheSubscriber, InvalidationEvent},
    services::ttl_cache::TtlSlot,
};

/// Visibilidade por grupo de acesso. Cache só em memória: troca de grupo
/// precisa valer logo após um novo login.
pub struct GroupAccessResolver {
    backend: Arc<dyn GroupAccessBackend>,
    clock: Arc<dyn Clock>,
    classifier: Arc<dyn ErrorClassifier>,
    ttl: TimeDelta,
    info: TtlSlot<GroupAccessInfo>,
    accessible_modules: TtlSlot<BTreeSet<String>>,
    accessible_screens: TtlSlot<BTreeSet<String>>,
}

impl GroupAccessResolver {
    pub fn new(
        backend: Arc<dyn GroupAccessBackend>,
        clock: Arc<dyn Clock>,
        classifier: Arc<dyn ErrorClassifier>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            backend,
            clock,
            classifier,
            ttl,
            info: TtlSlot::new(),
            accessible_modules: TtlSlot::new(),
            accessible_screens: TtlSlot::new(),
        }
    }

    fn log_failure(&self, what: &str, e: &BackendError) {
        let class = self.classifier.classify(e);
        if class.is_expected() {
            tracing::warn!("{} recusado pelo CRM ({:?}): {}", what, class, e);
        } else {
            tracing::error!("🔥 Falha inesperada em {}: {}", what, e);
        }
    }

    // =========================================================================
    //  1. AGREGADO (GET /GroupAccess/user-info)
    // =========================================================================

    pub async fn get_group_access_info(&self) -> GroupAccessInfo {
        self.resolve_group_access_info()
            .await
            .unwrap_or_else(|_| GroupAccessInfo::restrictive())
    }

    /// Expõe a falha para quem compõe decisões; o getter público troca a
    /// falha pela configuração restritiva.
    pub async fn resolve_group_access_info(&self) -> Result<GroupAccessInfo, BackendError> {
        if let Some(cached) = self.info.get(self.clock.now()) {
            tracing::debug!("Acesso do grupo servido do cache");
            return Ok(cached);
        }

        match self.backend.user_info().await {
            Ok(info) => {
                self.info.put(info.clone(), self.clock.now(), self.ttl);
                Ok(info)
            }
            Err(e) => {
                self.log_failure("user-info", &e);
                Err(e)
            }
        }
    }

    /// Telas liberadas menos as ocultas (oculto vence).
    pub async fn get_accessible_screens(&self) -> BTreeSet<String> {
        self.get_group_access_info().await.accessible_screens()
    }

    pub async fn is_screen_hidden(&self, screen: &str) -> bool {
        self.get_group_access_info().await.is_screen_hidden(screen)
    }

    pub async fn is_filial_only(&self) -> bool {
        self.get_group_access_info().await.branch_restricted
    }

    pub async fn is_read_only(&self) -> bool {
        self.get_group_access_info().await.read_only
    }

    pub async fn should_hide_users_tab(&self) -> bool {
        self.get_group_access_info().await.hide_users_tab
    }

    pub async fn get_group_name(&self) -> String {
        self.get_group_access_info().await.group_name
    }

    pub async fn get_group_description(&self) -> String {
        self.get_group_access_info().await.description
    }

    // =========================================================================
    //  2. PAPÉIS
    // =========================================================================

    async fn group_is(&self, name: &str) -> bool {
        self.get_group_name().await == name
    }

    pub async fn is_admin(&self) -> bool {
        self.group_is(GRUPO_ADMINISTRADOR).await
    }

    pub async fn is_consultor(&self) -> bool {
        self.group_is(GRUPO_CONSULTORES).await
    }

    pub async fn is_gestor_filial(&self) -> bool {
        self.group_is(GRUPO_GESTOR_FILIAL).await
    }

    pub async fn is_administrativo_filial(&self) -> bool {
        self.group_is(GRUPO_ADMINISTRATIVO_FILIAL).await
    }

    pub async fn is_financeiro(&self) -> bool {
        self.group_is(GRUPO_FINANCEIRO).await
    }

    pub async fn is_faturamento(&self) -> bool {
        self.group_is(GRUPO_FATURAMENTO).await
    }

    /// Falso para o grupo genérico "Usuario" (inclui o padrão restritivo).
    pub async fn has_valid_group(&self) -> bool {
        !self.group_is(GRUPO_USUARIO).await
    }

    // =========================================================================
    //  3. CONSULTAS PONTUAIS (sempre vão ao CRM)
    // =========================================================================

    pub async fn can_access_module(&self, module: Module) -> bool {
        match self.backend.can_access_module(module).await {
            Ok(allowed) => allowed,
            Err(e) => {
                self.log_failure("can-access-module", &e);
                false
            }
        }
    }

    pub async fn can_access_screen(&self, screen: &str) -> bool {
        match self.backend.can_access_screen(screen).await {
            Ok(allowed) => allowed,
            Err(e) => {
                self.log_failure("can-access-screen", &e);
                false
            }
        }
    }

    /// Na dúvida, o módulo fica oculto.
    pub async fn is_module_hidden(&self, module: Module) -> bool {
        match self.backend.is_module_hidden(module).await {
            Ok(hidden) => hidden,
            Err(e) => {
                self.log_failure("is-module-hidden", &e);
                true
            }
        }
    }

    // Listas dedicadas, cada uma com seu próprio slot de cache

    pub async fn fetch_accessible_modules(&self) -> BTreeSet<String> {
        if let Some(cached) = self.accessible_modules.get(self.clock.now()) {
            return cached;
        }
        match self.backend.accessible_modules().await {
            Ok(modules) => {
                self.accessible_modules.put(modules.clone(), self.clock.now(), self.ttl);
                modules
            }
            Err(e) => {
                self.log_failure("accessible-modules", &e);
                BTreeSet::new()
            }
        }
    }

    pub async fn fetch_accessible_screens(&self) -> BTreeSet<String> {
        if let Some(cached) = self.accessible_screens.get(self.clock.now()) {
            return cached;
        }
        match self.backend.accessible_screens().await {
            Ok(screens) => {
                self.accessible_screens.put(screens.clone(), self.clock.now(), self.ttl);
                screens
            }
            Err(e) => {
                self.log_failure("accessible-screens", &e);
                BTreeSet::new()
            }
        }
    }

    pub fn invalidate_cache(&self) {
        self.info.clear();
        self.accessible_modules.clear();
        self.accessible_screens.clear();
        tracing::debug!("Cache de acesso do grupo limpo");
    }
}

#[async_trait]
impl CacheSubscriber for GroupAccessResolver {
    fn name(&self) -> &'static str {
        "group-access"
    }

    fn reacts_to(&self) -> &'static [InvalidationEvent] {
        &[InvalidationEvent::Logout, InvalidationEvent::GroupChanged]
    }

    async fn invalidate(&self) {
        self.invalidate_cache();
    }
}
