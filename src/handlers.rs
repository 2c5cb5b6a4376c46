pub mod catalog;
pub mod health;
pub mod me;
pub mod navigation;
pub mod session;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::{ApiError, AppError},
    middleware::i18n::Locale,
    models::{Action, Module},
};

/// Resposta padrão das checagens pontuais.
#[derive(Debug, Serialize, ToSchema)]
pub struct AllowedResponse {
    pub allowed: bool,
}

// Segmentos de caminho viram 400 localizado quando não batem com o catálogo
pub(crate) fn parse_module(raw: &str, locale: &Locale) -> Result<Module, ApiError> {
    raw.parse::<Module>()
        .map_err(|e| AppError::InvalidModule(e.0).to_api_error(locale))
}

pub(crate) fn parse_action(raw: &str, locale: &Locale) -> Result<Action, ApiError> {
    raw.parse::<Action>()
        .map_err(|e| AppError::InvalidAction(e.0).to_api_error(locale))
}
