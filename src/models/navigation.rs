// src/models/navigation.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::permission::{Action, Module};

/// Entrada estática do catálogo de rotas. Não depende do usuário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    #[schema(value_type = String, example = "/clientes")]
    pub path: &'static str,
    pub module: Module,
    /// Ação mínima para enxergar a rota (sempre Visualizar).
    pub action: Action,
    #[schema(value_type = String, example = "Clientes")]
    pub label: &'static str,
    #[schema(value_type = String, example = "users")]
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
pub enum RouteCategory {
    Cadastros,
    Gestao,
    Financeiro,
    Administracao,
}

impl RouteCategory {
    pub const ORDER: [RouteCategory; 4] = [
        RouteCategory::Cadastros,
        RouteCategory::Gestao,
        RouteCategory::Financeiro,
        RouteCategory::Administracao,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RouteCategory::Cadastros => "Cadastros",
            RouteCategory::Gestao => "Gestão",
            RouteCategory::Financeiro => "Financeiro",
            RouteCategory::Administracao => "Administração",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteGroup {
    pub category: RouteCategory,
    #[schema(value_type = String, example = "Cadastros")]
    pub label: &'static str,
    pub routes: Vec<RouteDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbItem {
    #[schema(example = "Início")]
    pub label: String,
    #[schema(example = "/")]
    pub path: String,
    pub icon: Option<String>,
    /// Ligado apenas no item único devolvido quando a rota não existe.
    pub not_found: bool,
}

impl BreadcrumbItem {
    pub fn home() -> Self {
        Self {
            label: "Início".to_string(),
            path: "/".to_string(),
            icon: Some("home".to_string()),
            not_found: false,
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self {
            label: "Página não encontrada".to_string(),
            path: path.to_string(),
            icon: None,
            not_found: true,
        }
    }
}

impl From<&RouteDescriptor> for BreadcrumbItem {
    fn from(route: &RouteDescriptor) -> Self {
        Self {
            label: route.label.to_string(),
            path: route.path.to_string(),
            icon: Some(route.icon.to_string()),
            not_found: false,
        }
    }
}
