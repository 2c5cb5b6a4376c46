// src/models/group_access.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Nomes de grupo conhecidos pelo CRM
pub const GRUPO_ADMINISTRADOR: &str = "Administrador";
pub const GRUPO_CONSULTORES: &str = "Consultores";
pub const GRUPO_GESTOR_FILIAL: &str = "Gestor de Filial";
pub const GRUPO_ADMINISTRATIVO_FILIAL: &str = "Administrativo de Filial";
pub const GRUPO_FINANCEIRO: &str = "Financeiro";
pub const GRUPO_FATURAMENTO: &str = "Faturamento";
/// Grupo genérico atribuído quando o usuário não tem grupo de verdade.
pub const GRUPO_USUARIO: &str = "Usuario";

/// Grupos que só enxergam dados da própria filial.
pub const FILIAL_RESTRICTED_GROUPS: [&str; 3] =
    [GRUPO_GESTOR_FILIAL, GRUPO_ADMINISTRATIVO_FILIAL, GRUPO_CONSULTORES];

// O que vem de GET /GroupAccess/user-info
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupAccessInfo {
    #[serde(default)]
    pub group_id: i64,

    #[schema(example = "Consultores")]
    pub group_name: String,

    #[serde(default)]
    pub description: String,

    // Módulos e telas chegam como texto. Um nome novo no backend não pode
    // derrubar a desserialização inteira.
    #[serde(default)]
    #[schema(value_type = Vec<String>, example = json!(["Cliente", "Contrato"]))]
    pub allowed_modules: BTreeSet<String>,

    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub hidden_modules: BTreeSet<String>,

    #[serde(default)]
    #[schema(value_type = Vec<String>, example = json!(["clientes", "contratos"]))]
    pub allowed_screens: BTreeSet<String>,

    #[serde(default)]
    #[schema(value_type = Vec<String>, example = json!(["usuarios"]))]
    pub hidden_screens: BTreeSet<String>,

    #[serde(default = "fail_closed")]
    pub branch_restricted: bool,

    #[serde(default = "fail_closed")]
    pub read_only: bool,

    #[serde(default = "fail_closed")]
    pub hide_users_tab: bool,
}

// Flag ausente no payload conta como restrição ligada
fn fail_closed() -> bool {
    true
}

impl GroupAccessInfo {
    /// Configuração mais restritiva possível, usada quando a busca falha.
    pub fn restrictive() -> Self {
        Self {
            group_id: 0,
            group_name: GRUPO_USUARIO.to_string(),
            description: "Acesso restrito".to_string(),
            allowed_modules: BTreeSet::new(),
            hidden_modules: BTreeSet::new(),
            allowed_screens: BTreeSet::new(),
            hidden_screens: BTreeSet::new(),
            branch_restricted: true,
            read_only: true,
            hide_users_tab: true,
        }
    }

    /// Oculto vence: uma tela nas duas listas é tratada como oculta.
    pub fn is_screen_hidden(&self, screen: &str) -> bool {
        self.hidden_screens.contains(screen)
    }

    pub fn accessible_screens(&self) -> BTreeSet<String> {
        self.allowed_screens
            .iter()
            .filter(|s| !self.is_screen_hidden(s))
            .cloned()
            .collect()
    }
}
