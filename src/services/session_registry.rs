// src/services/session_registry.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use uuid::Uuid;

use crate::{
    backend::HttpCrmBackend,
    common::clock::Clock,
    services::access_context::{session_id_for, AccessContext},
    services::classifier::ErrorClassifier,
    store::{KeyValueStore, NamespacedStore, AUTH_FLAG_KEY, PERMISSIONS_CACHE_KEY},
};

struct SessionEntry {
    ctx: Arc<AccessContext>,
    last_used: DateTime<Utc>,
}

/// Um `AccessContext` por token. Cada sessão fala com o CRM usando o próprio
/// token e grava no próprio namespace do armazenamento.
///
/// Sessões ociosas por mais de um TTL saem da memória. O que foi persistido
/// fica no armazenamento e é restaurado se o token voltar.
pub struct SessionRegistry {
    http: Client,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    classifier: Arc<dyn ErrorClassifier>,
    ttl: TimeDelta,
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(
        http: Client,
        base_url: &str,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        classifier: Arc<dyn ErrorClassifier>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            store,
            clock,
            classifier,
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    // Varre as ociosas e, se a sessão pedida sobreviveu, marca o uso
    fn sweep_and_touch(&self, session_id: &Uuid, now: DateTime<Utc>) -> Option<Arc<AccessContext>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.last_used < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("{} sessão(ões) ociosa(s) removida(s) da memória", evicted);
        }

        sessions.get_mut(session_id).map(|entry| {
            entry.last_used = now;
            entry.ctx.clone()
        })
    }

    pub async fn context_for(&self, token: &str) -> Arc<AccessContext> {
        let session_id = session_id_for(token);
        let now = self.clock.now();
        if let Some(ctx) = self.sweep_and_touch(&session_id, now) {
            return ctx;
        }

        let backend = Arc::new(HttpCrmBackend::new(self.http.clone(), &self.base_url, token));
        let store: Arc<dyn KeyValueStore> =
            Arc::new(NamespacedStore::new(self.store.clone(), &session_id.to_string()));
        let ctx = Arc::new(
            AccessContext::open(
                session_id,
                backend,
                store,
                self.clock.clone(),
                self.classifier.clone(),
                self.ttl,
            )
            .await,
        );

        // Duas requisições simultâneas podem abrir a mesma sessão: fica a primeira
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(session_id)
            .or_insert(SessionEntry { ctx, last_used: now })
            .ctx
            .clone()
    }

    /// Encerra a sessão do token e devolve quantos caches foram avisados
    /// (zero se ela não estava aberta neste processo). O marcador fica
    /// gravado como "false": o mesmo token continua negado depois disso.
    pub async fn logout(&self, token: &str) -> usize {
        let session_id = session_id_for(token);
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&session_id);

        match removed {
            Some(entry) => entry.ctx.logout().await,
            None => {
                // Sessão de uma execução anterior: limpa só o que ficou persistido
                let store = NamespacedStore::new(self.store.clone(), &session_id.to_string());
                if let Err(e) = store.set(AUTH_FLAG_KEY, "false").await {
                    tracing::warn!("Falha ao limpar marcador de sessão {}: {}", session_id, e);
                }
                if let Err(e) = store.remove(PERMISSIONS_CACHE_KEY).await {
                    tracing::warn!("Falha ao remover cache da sessão {}: {}", session_id, e);
                }
                0
            }
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
