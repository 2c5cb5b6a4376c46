use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::backend::BackendError;
use crate::middleware::i18n::Locale;

// Erros da camada de serviço/HTTP. Os resolvers nunca devolvem estes erros
// para decisões de autorização: lá toda falha vira "sem acesso".
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Sessão não autenticada")]
    Unauthenticated,

    #[error("Módulo inválido: {0}")]
    InvalidModule(String),

    #[error("Ação inválida: {0}")]
    InvalidAction(String),

    #[error("Evento de invalidação inválido: {0}")]
    InvalidEvent(String),

    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Erro ao consultar a API do CRM: {0}")]
    Backend(#[from] BackendError),
}

// O que efetivamente sai na resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidModule(_)
            | AppError::InvalidAction(_)
            | AppError::InvalidEvent(_)
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Traduz o erro para o idioma pedido no `Accept-Language`.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let pt = locale.is_portuguese();
        let status = self.status();

        let (error, details) = match self {
            AppError::Unauthenticated => (
                if pt { "Token de autenticação inválido ou ausente." } else { "Missing or invalid authentication token." }.to_string(),
                None,
            ),
            AppError::InvalidModule(m) => (
                if pt { format!("Módulo '{m}' não existe.") } else { format!("Module '{m}' does not exist.") },
                None,
            ),
            AppError::InvalidAction(a) => (
                if pt { format!("Ação '{a}' não existe.") } else { format!("Action '{a}' does not exist.") },
                None,
            ),
            AppError::InvalidEvent(e) => (
                if pt { format!("Evento '{e}' não é reconhecido.") } else { format!("Event '{e}' is not recognized.") },
                None,
            ),
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                (
                    if pt { "Um ou mais campos são inválidos." } else { "One or more fields are invalid." }.to_string(),
                    Some(Value::Object(details)),
                )
            }
            AppError::Backend(e) => {
                tracing::error!("Falha na API do CRM: {}", e);
                (
                    if pt { "Não foi possível consultar o CRM." } else { "Could not reach the CRM backend." }.to_string(),
                    None,
                )
            }
        };

        ApiError { status, error, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
