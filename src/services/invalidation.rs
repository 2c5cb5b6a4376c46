// src/services/invalidation.rs

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidationEvent {
    Logout,
    PermissionsChanged,
    GroupChanged,
}

impl InvalidationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidationEvent::Logout => "logout",
            InvalidationEvent::PermissionsChanged => "permissions-changed",
            InvalidationEvent::GroupChanged => "group-changed",
        }
    }
}

impl fmt::Display for InvalidationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvalidationEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logout" => Ok(InvalidationEvent::Logout),
            "permissions-changed" => Ok(InvalidationEvent::PermissionsChanged),
            "group-changed" => Ok(InvalidationEvent::GroupChanged),
            other => Err(other.to_string()),
        }
    }
}

/// Um cache que sabe se invalidar e declara a quais eventos reage.
#[async_trait]
pub trait CacheSubscriber: Send + Sync {
    fn name(&self) -> &'static str;

    fn reacts_to(&self) -> &'static [InvalidationEvent];

    async fn invalidate(&self);
}

/// Barramento de invalidação: ninguém chama método privado de outro resolver.
#[derive(Default)]
pub struct InvalidationBus {
    subscribers: RwLock<Vec<Arc<dyn CacheSubscriber>>>,
}

impl InvalidationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn CacheSubscriber>) {
        tracing::debug!(
            "Cache '{}' inscrito em {:?}",
            subscriber.name(),
            subscriber.reacts_to()
        );
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(subscriber);
    }

    /// Invalida, na ordem de inscrição, quem reage ao evento.
    /// Devolve quantos caches foram notificados.
    pub async fn publish(&self, event: InvalidationEvent) -> usize {
        // Copia a lista: o lock não pode atravessar o .await
        let targets: Vec<Arc<dyn CacheSubscriber>> = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|s| s.reacts_to().contains(&event))
            .cloned()
            .collect();

        for target in &targets {
            target.invalidate().await;
        }

        tracing::info!("🧹 Evento '{}' invalidou {} cache(s)", event, targets.len());
        targets.len()
    }
}
