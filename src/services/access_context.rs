// src/services/access_context.rs

use std::sync::Arc;

use chrono::TimeDelta;
use uuid::Uuid;

use crate::{
    backend::{GroupAccessBackend, PermissionBackend},
    common::clock::Clock,
    services::classifier::ErrorClassifier,
    services::group_access_resolver::GroupAccessResolver,
    services::invalidation::{InvalidationBus, InvalidationEvent},
    services::navigation_resolver::NavigationResolver,
    services::permission_resolver::PermissionResolver,
    store::{KeyValueStore, AUTH_FLAG_KEY},
};

/// Id estável da sessão: o mesmo token sempre cai no mesmo namespace
/// do armazenamento, inclusive depois de reiniciar o processo.
pub fn session_id_for(token: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, token.as_bytes())
}

/// Os três resolvers de uma sessão, já ligados ao barramento.
pub struct AccessContext {
    pub session_id: Uuid,
    pub permissions: Arc<PermissionResolver>,
    pub group_access: Arc<GroupAccessResolver>,
    pub navigation: Arc<NavigationResolver>,
    store: Arc<dyn KeyValueStore>,
    bus: InvalidationBus,
}

impl AccessContext {
    /// Monta o contexto, liga o marcador de sessão e restaura o cache
    /// de permissões de uma execução anterior.
    ///
    /// O marcador só é ligado quando ainda não existe. Um token que já fez
    /// logout continua com "false" e tudo segue negado.
    pub async fn open<B>(
        session_id: Uuid,
        backend: Arc<B>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        classifier: Arc<dyn ErrorClassifier>,
        ttl: TimeDelta,
    ) -> Self
    where
        B: PermissionBackend + GroupAccessBackend + 'static,
    {
        let permissions = Arc::new(PermissionResolver::new(
            backend.clone(),
            store.clone(),
            clock.clone(),
            classifier.clone(),
            ttl,
        ));
        let group_access = Arc::new(GroupAccessResolver::new(
            backend,
            clock.clone(),
            classifier,
            ttl,
        ));
        let navigation = Arc::new(NavigationResolver::new(
            permissions.clone(),
            group_access.clone(),
            clock,
            ttl,
        ));

        let bus = InvalidationBus::new();
        bus.subscribe(permissions.clone());
        bus.subscribe(group_access.clone());
        bus.subscribe(navigation.clone());

        match store.get(AUTH_FLAG_KEY).await {
            Ok(None) => {
                if let Err(e) = store.set(AUTH_FLAG_KEY, "true").await {
                    // Sem marcador as permissões resolvem vazias
                    tracing::warn!("Falha ao gravar marcador de sessão {}: {}", session_id, e);
                }
                permissions.restore_persisted_cache().await;
                tracing::info!("✅ Sessão {} aberta", session_id);
            }
            Ok(Some(flag)) if flag == "true" => {
                permissions.restore_persisted_cache().await;
                tracing::info!("✅ Sessão {} retomada", session_id);
            }
            Ok(Some(_)) => {
                tracing::info!("Sessão {} já encerrada, acesso segue negado", session_id);
            }
            Err(e) => {
                tracing::warn!("Falha ao ler marcador de sessão {}: {}", session_id, e);
            }
        }

        Self {
            session_id,
            permissions,
            group_access,
            navigation,
            store,
            bus,
        }
    }

    pub async fn publish(&self, event: InvalidationEvent) -> usize {
        self.bus.publish(event).await
    }

    /// Desliga o marcador e dispara `logout` para todos os caches.
    pub async fn logout(&self) -> usize {
        if let Err(e) = self.store.set(AUTH_FLAG_KEY, "false").await {
            tracing::warn!("Falha ao limpar marcador de sessão {}: {}", self.session_id, e);
        }
        let notified = self.publish(InvalidationEvent::Logout).await;
        tracing::info!("👋 Sessão {} encerrada", self.session_id);
        notified
    }
}
