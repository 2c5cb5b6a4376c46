// src/backend.rs
//
// Contratos com a API REST do CRM. Os resolvers só conhecem estes traits;
// a implementação HTTP fica em `backend/http.rs`.

pub mod http;

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::group_access::GroupAccessInfo;
use crate::models::permission::{AccessGroup, Action, Module, PermissionDefinition, UserPermissions};

pub use http::HttpCrmBackend;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Resposta HTTP fora da faixa 2xx.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Tempo esgotado: {0}")]
    Timeout(String),

    #[error("Falha de rede: {0}")]
    Network(String),

    /// Corpo da resposta não pôde ser interpretado.
    #[error("Resposta inválida: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Código explícito enviado pelo backend, quando existe.
    pub fn code(&self) -> Option<&str> {
        match self {
            BackendError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Endpoints `/Permission/*`.
#[async_trait]
pub trait PermissionBackend: Send + Sync {
    async fn user_status(&self) -> Result<UserPermissions, BackendError>;

    async fn check_permission(&self, module: Module, action: Action) -> Result<bool, BackendError>;

    async fn can_access_record(&self, module: Module, record_id: i64) -> Result<bool, BackendError>;

    async fn list_groups(&self) -> Result<Vec<AccessGroup>, BackendError>;

    async fn list_permissions(&self) -> Result<Vec<PermissionDefinition>, BackendError>;
}

/// Endpoints `/GroupAccess/*`.
#[async_trait]
pub trait GroupAccessBackend: Send + Sync {
    async fn user_info(&self) -> Result<GroupAccessInfo, BackendError>;

    async fn can_access_module(&self, module: Module) -> Result<bool, BackendError>;

    async fn can_access_screen(&self, screen: &str) -> Result<bool, BackendError>;

    async fn is_module_hidden(&self, module: Module) -> Result<bool, BackendError>;

    async fn accessible_modules(&self) -> Result<BTreeSet<String>, BackendError>;

    async fn accessible_screens(&self) -> Result<BTreeSet<String>, BackendError>;
}
