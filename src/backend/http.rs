// src/backend/http.rs

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{BackendError, GroupAccessBackend, PermissionBackend};
use crate::models::group_access::GroupAccessInfo;
use crate::models::permission::{AccessGroup, Action, Module, PermissionDefinition, UserPermissions};

/// Cliente HTTP compartilhado entre sessões (pool de conexões único).
pub fn build_http_client(timeout: Duration) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| BackendError::Network(e.to_string()))
}

/// Backend REST do CRM, autenticado com o token da sessão.
#[derive(Clone)]
pub struct HttpCrmBackend {
    client: Client,
    base_url: String,
    token: String,
}

// Corpo de erro: o backend ora manda `message`, ora `error`, ora um
// ProblemDetails do ASP.NET (`title` + `detail` juntos)
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "errorCode")]
    code: Option<String>,
}

impl ErrorBody {
    // O campo mais específico vence
    fn best_message(self) -> Option<String> {
        self.message.or(self.error).or(self.detail).or(self.title)
    }
}

// Os endpoints booleanos respondem `true` ou `{ "result": true }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoolPayload {
    Bare(bool),
    Wrapped(BoolFields),
}

#[derive(Debug, Deserialize)]
struct BoolFields {
    #[serde(alias = "hasPermission", alias = "canAccess", alias = "isHidden", alias = "value")]
    result: bool,
}

impl From<BoolPayload> for bool {
    fn from(payload: BoolPayload) -> Self {
        match payload {
            BoolPayload::Bare(b) => b,
            BoolPayload::Wrapped(f) => f.result,
        }
    }
}

impl HttpCrmBackend {
    pub fn new(client: Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn map_transport_error(e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(e.to_string())
        } else if e.is_decode() {
            BackendError::InvalidResponse(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(Self::map_transport_error)?;

        if !status.is_success() {
            let mut parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let code = parsed.code.take();
            let message = parsed
                .best_message()
                .unwrap_or_else(|| if body.trim().is_empty() { status.to_string() } else { body.clone() });
            return Err(BackendError::Status {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse(format!("{path}: {e}")))
    }

    async fn get_bool(&self, path: &str) -> Result<bool, BackendError> {
        let payload: BoolPayload = self.get_json(path).await?;
        Ok(payload.into())
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[async_trait]
impl PermissionBackend for HttpCrmBackend {
    async fn user_status(&self) -> Result<UserPermissions, BackendError> {
        self.get_json("/Permission/user-status").await
    }

    async fn check_permission(&self, module: Module, action: Action) -> Result<bool, BackendError> {
        self.get_bool(&format!("/Permission/check-permission/{}/{}", module, action))
            .await
    }

    async fn can_access_record(&self, module: Module, record_id: i64) -> Result<bool, BackendError> {
        self.get_bool(&format!("/Permission/can-access/{}/{}", module, record_id))
            .await
    }

    async fn list_groups(&self) -> Result<Vec<AccessGroup>, BackendError> {
        self.get_json("/Permission/grupos").await
    }

    async fn list_permissions(&self) -> Result<Vec<PermissionDefinition>, BackendError> {
        self.get_json("/Permission/permissoes").await
    }
}

#[async_trait]
impl GroupAccessBackend for HttpCrmBackend {
    async fn user_info(&self) -> Result<GroupAccessInfo, BackendError> {
        self.get_json("/GroupAccess/user-info").await
    }

    async fn can_access_module(&self, module: Module) -> Result<bool, BackendError> {
        self.get_bool(&format!("/GroupAccess/can-access-module/{}", module))
            .await
    }

    async fn can_access_screen(&self, screen: &str) -> Result<bool, BackendError> {
        self.get_bool(&format!("/GroupAccess/can-access-screen/{}", segment(screen)))
            .await
    }

    async fn is_module_hidden(&self, module: Module) -> Result<bool, BackendError> {
        self.get_bool(&format!("/GroupAccess/is-module-hidden/{}", module))
            .await
    }

    async fn accessible_modules(&self) -> Result<BTreeSet<String>, BackendError> {
        self.get_json("/GroupAccess/accessible-modules").await
    }

    async fn accessible_screens(&self) -> Result<BTreeSet<String>, BackendError> {
        self.get_json("/GroupAccess/accessible-screens").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_payload_accepts_bare_and_wrapped_forms() {
        let bare: BoolPayload = serde_json::from_str("true").unwrap();
        let wrapped: BoolPayload = serde_json::from_str(r#"{"canAccess": false}"#).unwrap();
        let result: BoolPayload = serde_json::from_str(r#"{"result": true}"#).unwrap();

        assert!(bool::from(bare));
        assert!(!bool::from(wrapped));
        assert!(bool::from(result));
    }

    #[test]
    fn error_body_reads_alternative_field_names() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"title": "Sessão expirada", "errorCode": "SESSION_EXPIRED"}"#).unwrap();

        assert_eq!(body.code.as_deref(), Some("SESSION_EXPIRED"));
        assert_eq!(body.best_message().as_deref(), Some("Sessão expirada"));
    }

    #[test]
    fn problem_details_keeps_code_and_prefers_detail() {
        let body: ErrorBody = serde_json::from_str(
            r#"{
                "type": "https://tools.ietf.org/html/rfc7235#section-3.1",
                "title": "Unauthorized",
                "status": 401,
                "detail": "Token expirado em 2026-05-11T13:00:00Z",
                "code": "INVALID_TOKEN"
            }"#,
        )
        .unwrap();

        assert_eq!(body.code.as_deref(), Some("INVALID_TOKEN"));
        assert_eq!(
            body.best_message().as_deref(),
            Some("Token expirado em 2026-05-11T13:00:00Z")
        );
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let backend = HttpCrmBackend::new(Client::new(), "http://crm.local/api/", "t");
        assert_eq!(backend.base_url, "http://crm.local/api");
    }
}
