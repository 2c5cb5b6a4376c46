// src/models/permission.rs

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- ENUMS ---

/// Módulos de negócio com permissões CRUD independentes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Module {
    Cliente,
    Contrato,
    Consultor,
    Parceiro,
    Boleto,
    Usuario,
    Filial,
    GrupoAcesso,
    PessoaFisica,
    PessoaJuridica,
}

impl Module {
    pub const ALL: [Module; 10] = [
        Module::Cliente,
        Module::Contrato,
        Module::Consultor,
        Module::Parceiro,
        Module::Boleto,
        Module::Usuario,
        Module::Filial,
        Module::GrupoAcesso,
        Module::PessoaFisica,
        Module::PessoaJuridica,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Cliente => "Cliente",
            Module::Contrato => "Contrato",
            Module::Consultor => "Consultor",
            Module::Parceiro => "Parceiro",
            Module::Boleto => "Boleto",
            Module::Usuario => "Usuario",
            Module::Filial => "Filial",
            Module::GrupoAcesso => "GrupoAcesso",
            Module::PessoaFisica => "PessoaFisica",
            Module::PessoaJuridica => "PessoaJuridica",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Módulo desconhecido: {0}")]
pub struct UnknownModule(pub String);

impl FromStr for Module {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Ações que podem ser concedidas sobre um módulo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Action {
    Visualizar,
    Incluir,
    Editar,
    Excluir,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Visualizar, Action::Incluir, Action::Editar, Action::Excluir];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Visualizar => "Visualizar",
            Action::Incluir => "Incluir",
            Action::Editar => "Editar",
            Action::Excluir => "Excluir",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Ação desconhecida: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Monta a string de permissão no formato `"<Modulo>_<Acao>"`.
pub fn permission_key(module: Module, action: Action) -> String {
    format!("{}_{}", module.as_str(), action.as_str())
}

// --- PERMISSÕES DO USUÁRIO ---

pub const EMPTY_PERMISSIONS_MESSAGE: &str = "Usuário sem permissões ativas ou sessão expirada.";

// O que vem de GET /Permission/user-status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissions {
    #[serde(default)]
    #[schema(example = 42)]
    pub user_id: i64,

    #[serde(default)]
    #[schema(example = "Maria Souza")]
    pub display_name: String,

    #[serde(default)]
    #[schema(example = "maria.souza")]
    pub login: String,

    #[serde(default)]
    #[schema(example = "Consultores")]
    pub group_name: String,

    #[serde(default)]
    pub branch_name: Option<String>,

    #[serde(default)]
    pub has_no_permission: bool,

    #[serde(default)]
    pub message: Option<String>,

    // Conjunto: duplicatas somem na desserialização
    #[serde(default)]
    #[schema(value_type = Vec<String>, example = json!(["Cliente_Visualizar", "Contrato_Editar"]))]
    pub permissions: BTreeSet<String>,
}

impl UserPermissions {
    /// O objeto fixo de "sem permissões" usado em todo caminho de falha.
    pub fn empty() -> Self {
        Self {
            user_id: 0,
            display_name: String::new(),
            login: String::new(),
            group_name: String::new(),
            branch_name: None,
            has_no_permission: true,
            message: Some(EMPTY_PERMISSIONS_MESSAGE.to_string()),
            permissions: BTreeSet::new(),
        }
    }

    pub fn grants(&self, module: Module, action: Action) -> bool {
        !self.has_no_permission && self.permissions.contains(&permission_key(module, action))
    }
}

// Entrada persistida no armazenamento durável (chave `crm_permissions_cache`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPermissions {
    pub user_id: i64,
    pub permissions: UserPermissions,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

// --- CATÁLOGOS (telas de administração) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessGroup {
    #[schema(example = 3)]
    pub id: i64,

    #[schema(example = "Gestor de Filial")]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDefinition {
    pub id: i64,

    #[schema(example = "Cliente_Visualizar")]
    pub name: String,

    #[schema(example = "Cliente")]
    pub module: String,

    #[schema(example = "Visualizar")]
    pub action: String,

    #[serde(default)]
    pub description: Option<String>,
}
