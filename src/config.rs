// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::TimeDelta;
use validator::Validate;

use crate::{
    backend::http::build_http_client,
    common::clock::SystemClock,
    services::{classifier::DefaultErrorClassifier, SessionRegistry},
    store::file_store::FileStore,
};

// Configuração lida do ambiente (.env)
#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    #[validate(url(message = "CRM_API_BASE_URL deve ser uma URL válida"))]
    pub crm_api_base_url: String,

    #[validate(length(min = 1, message = "BIND_ADDR não pode ser vazio"))]
    pub bind_addr: String,

    pub cache_dir: PathBuf,

    #[validate(range(min = 1, max = 3600, message = "CACHE_TTL_SECS deve estar entre 1 e 3600"))]
    pub cache_ttl_secs: u64,

    #[validate(range(min = 1, max = 120, message = "HTTP_TIMEOUT_SECS deve estar entre 1 e 120"))]
    pub http_timeout_secs: u64,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_secs(name: &str, default: &str) -> anyhow::Result<u64> {
    var_or(name, default)
        .trim()
        .parse()
        .with_context(|| format!("{name} deve ser um número inteiro de segundos"))
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let crm_api_base_url =
            env::var("CRM_API_BASE_URL").context("CRM_API_BASE_URL deve ser definida")?;

        let config = Self {
            crm_api_base_url,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            cache_dir: PathBuf::from(var_or("CACHE_DIR", ".crm_cache")),
            cache_ttl_secs: parse_secs("CACHE_TTL_SECS", "300")?,
            http_timeout_secs: parse_secs("HTTP_TIMEOUT_SECS", "15")?,
        };

        config.validate().context("Configuração inválida")?;
        Ok(config)
    }

    pub fn cache_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.cache_ttl_secs as i64)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().context("Configuração inválida")?;

        // --- Monta o gráfico de dependências ---
        let store = FileStore::open(&config.cache_dir)
            .await
            .with_context(|| format!("Falha ao abrir o diretório de cache {:?}", config.cache_dir))?;
        tracing::info!("✅ Cache persistente em {:?}", config.cache_dir);

        let http = build_http_client(config.http_timeout())?;

        let sessions = SessionRegistry::new(
            http,
            &config.crm_api_base_url,
            Arc::new(store),
            Arc::new(SystemClock),
            Arc::new(DefaultErrorClassifier),
            config.cache_ttl(),
        );

        Ok(Self {
            sessions: Arc::new(sessions),
        })
    }
}
