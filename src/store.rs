// src/store.rs
//
// Armazenamento chave-valor durável (o "localStorage" do CRM).

pub mod file_store;
pub mod memory_store;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// Cache persistido de permissões.
pub const PERMISSIONS_CACHE_KEY: &str = "crm_permissions_cache";
/// Marcador de sessão autenticada (`"true"`/`"false"`).
pub const AUTH_FLAG_KEY: &str = "crm_is_authenticated";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chave inválida: {0}")]
    InvalidKey(String),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Isola as chaves de uma sessão dentro de um armazenamento compartilhado.
pub struct NamespacedStore {
    inner: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl NamespacedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>, namespace: &str) -> Self {
        Self {
            inner,
            prefix: format!("{namespace}."),
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl KeyValueStore for NamespacedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(&self.scoped(key)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(&self.scoped(key), value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(&self.scoped(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn namespaces_do_not_see_each_other() {
        let shared: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        let a = NamespacedStore::new(shared.clone(), "sessao-a");
        let b = NamespacedStore::new(shared.clone(), "sessao-b");

        a.set(AUTH_FLAG_KEY, "true").await.unwrap();

        assert_eq!(a.get(AUTH_FLAG_KEY).await.unwrap().as_deref(), Some("true"));
        assert_eq!(b.get(AUTH_FLAG_KEY).await.unwrap(), None);
        assert_eq!(
            shared.get("sessao-a.crm_is_authenticated").await.unwrap().as_deref(),
            Some("true")
        );
    }
}
