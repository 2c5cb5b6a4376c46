// src/services/permission_resolver.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;

use crate::{
    backend::{BackendError, PermissionBackend},
    common::clock::Clock,
    models::group_access::FILIAL_RESTRICTED_GROUPS,
    models::permission::{
        AccessGroup, Action, Module, PermissionDefinition, PersistedPermissions, UserPermissions,
    },
    services::classifier::ErrorClassifier,
    services::invalidation::{CacheSubscriber, InvalidationEvent},
    services::ttl_cache::TtlSlot,
    store::{KeyValueStore, AUTH_FLAG_KEY, PERMISSIONS_CACHE_KEY},
};

/// Fonte única de "o usuário pode fazer X no módulo Y".
///
/// Nenhuma decisão aqui devolve erro: toda falha vira o objeto de
/// "sem permissões" (`UserPermissions::empty`).
pub struct PermissionResolver {
    backend: Arc<dyn PermissionBackend>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    classifier: Arc<dyn ErrorClassifier>,
    ttl: TimeDelta,
    cache: TtlSlot<UserPermissions>,
}

impl PermissionResolver {
    pub fn new(
        backend: Arc<dyn PermissionBackend>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        classifier: Arc<dyn ErrorClassifier>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
            classifier,
            ttl,
            cache: TtlSlot::new(),
        }
    }

    // =========================================================================
    //  1. CARREGAMENTO E CACHE
    // =========================================================================

    async fn is_authenticated(&self) -> bool {
        match self.store.get(AUTH_FLAG_KEY).await {
            Ok(flag) => flag.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!("Não foi possível ler o marcador de sessão: {}", e);
                false
            }
        }
    }

    /// Sempre devolve um valor. Falhas viram o objeto vazio.
    pub async fn get_user_permissions(&self) -> UserPermissions {
        self.resolve_user_permissions()
            .await
            .unwrap_or_else(|_| UserPermissions::empty())
    }

    /// Igual a `get_user_permissions`, mas qualquer falha do CRM volta como
    /// `Err` para quem compõe decisões em cima desta. Só a ausência de sessão
    /// resolve para o objeto vazio. A classe da falha decide apenas o log.
    pub async fn resolve_user_permissions(&self) -> Result<UserPermissions, BackendError> {
        if !self.is_authenticated().await {
            tracing::debug!("Sem sessão autenticada, devolvendo permissões vazias");
            return Ok(UserPermissions::empty());
        }

        if let Some(cached) = self.cache.get(self.clock.now()) {
            tracing::debug!("Permissões servidas do cache");
            return Ok(cached);
        }

        match self.backend.user_status().await {
            Ok(permissions) => {
                let fetched_at = self.clock.now();
                let expires_at = self.cache.put(permissions.clone(), fetched_at, self.ttl);
                self.persist(PersistedPermissions {
                    user_id: permissions.user_id,
                    permissions: permissions.clone(),
                    timestamp: fetched_at,
                    expires_at,
                })
                .await;
                Ok(permissions)
            }
            Err(e) => {
                let class = self.classifier.classify(&e);
                if class.is_expected() {
                    tracing::warn!("Sessão/permissão recusada pelo CRM ({:?}): {}", class, e);
                } else {
                    tracing::error!("🔥 Falha inesperada ao buscar permissões: {}", e);
                }
                Err(e)
            }
        }
    }

    async fn persist(&self, entry: PersistedPermissions) {
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Falha ao serializar cache de permissões: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(PERMISSIONS_CACHE_KEY, &raw).await {
            tracing::warn!("Falha ao persistir cache de permissões: {}", e);
        }
    }

    async fn discard_persisted(&self) {
        if let Err(e) = self.store.remove(PERMISSIONS_CACHE_KEY).await {
            tracing::warn!("Falha ao remover cache de permissões persistido: {}", e);
        }
    }

    /// Recarrega o cache gravado por uma execução anterior.
    /// Entrada vencida ou ilegível é descartada e removida.
    pub async fn restore_persisted_cache(&self) -> bool {
        let raw = match self.store.get(PERMISSIONS_CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Falha ao ler cache de permissões persistido: {}", e);
                return false;
            }
        };

        let entry: PersistedPermissions = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Cache de permissões persistido corrompido: {}", e);
                self.discard_persisted().await;
                return false;
            }
        };

        if self.clock.now() < entry.expires_at {
            tracing::info!("✅ Cache de permissões restaurado (usuário {})", entry.user_id);
            self.cache.put_until(entry.permissions, entry.expires_at);
            true
        } else {
            tracing::debug!("Cache de permissões persistido vencido em {}", entry.expires_at);
            self.discard_persisted().await;
            false
        }
    }

    pub async fn invalidate_cache(&self) {
        self.cache.clear();
        self.discard_persisted().await;
    }

    // =========================================================================
    //  2. PREDICADOS
    // =========================================================================

    pub async fn has_permission(&self, module: Module, action: Action) -> bool {
        self.get_user_permissions().await.grants(module, action)
    }

    pub async fn can_view(&self, module: Module) -> bool {
        self.has_permission(module, Action::Visualizar).await
    }

    pub async fn can_create(&self, module: Module) -> bool {
        self.has_permission(module, Action::Incluir).await
    }

    pub async fn can_edit(&self, module: Module) -> bool {
        self.has_permission(module, Action::Editar).await
    }

    pub async fn can_delete(&self, module: Module) -> bool {
        self.has_permission(module, Action::Excluir).await
    }

    /// Somente leitura = sem permissões ou sem `Editar` no módulo.
    pub async fn is_read_only(&self, module: Module) -> bool {
        let permissions = self.get_user_permissions().await;
        permissions.has_no_permission || !permissions.grants(module, Action::Editar)
    }

    /// O grupo do usuário só enxerga a própria filial. Hoje o resultado
    /// depende apenas do grupo, não do módulo.
    pub async fn is_filial_only(&self, _module: Module) -> bool {
        let permissions = self.get_user_permissions().await;
        !permissions.has_no_permission
            && FILIAL_RESTRICTED_GROUPS.contains(&permissions.group_name.as_str())
    }

    /// Autorização por registro. Nunca cacheada (depende de filial, dono...).
    pub async fn can_access_record(&self, module: Module, record_id: i64) -> bool {
        match self.backend.can_access_record(module, record_id).await {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!("Falha ao verificar acesso ao registro {}/{}: {}", module, record_id, e);
                false
            }
        }
    }

    /// Pergunta direto ao CRM, sem passar pelo cache.
    pub async fn check_permission_remote(&self, module: Module, action: Action) -> bool {
        match self.backend.check_permission(module, action).await {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!("Falha ao verificar {}_{} no CRM: {}", module, action, e);
                false
            }
        }
    }

    // =========================================================================
    //  3. CATÁLOGOS (telas de administração)
    // =========================================================================

    pub async fn get_groups(&self) -> Result<Vec<AccessGroup>, BackendError> {
        self.backend.list_groups().await
    }

    pub async fn get_permission_catalog(&self) -> Result<Vec<PermissionDefinition>, BackendError> {
        self.backend.list_permissions().await
    }
}

#[async_trait]
impl CacheSubscriber for PermissionResolver {
    fn name(&self) -> &'static str {
        "permissions"
    }

    fn reacts_to(&self) -> &'static [InvalidationEvent] {
        &[InvalidationEvent::Logout, InvalidationEvent::PermissionsChanged]
    }

    async fn invalidate(&self) {
        self.invalidate_cache().await;
    }
}
