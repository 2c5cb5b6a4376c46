// src/catalog.rs
//
// Tabelas estáticas de navegação. Configuração declarativa, nada aqui depende
// do usuário logado.

use crate::models::navigation::{RouteCategory, RouteDescriptor};
use crate::models::permission::{Action, Module};

// Telas (vocabulário do controle por grupo)
pub const SCREEN_CLIENTES: &str = "clientes";
pub const SCREEN_CONTRATOS: &str = "contratos";
pub const SCREEN_CONSULTORES: &str = "consultores";
pub const SCREEN_PARCEIROS: &str = "parceiros";
pub const SCREEN_BOLETOS: &str = "boletos";
pub const SCREEN_USUARIOS: &str = "usuarios";
pub const SCREEN_FILIAIS: &str = "filiais";
pub const SCREEN_GRUPOS_ACESSO: &str = "grupos-acesso";
pub const SCREEN_PESSOAS: &str = "pessoas";

pub const MOBILE_MENU_LIMIT: usize = 6;

/// Catálogo completo, na ordem de exibição padrão.
pub static ROUTE_CATALOG: [RouteDescriptor; 10] = [
    route("/clientes", Module::Cliente, "Clientes", "users"),
    route("/contratos", Module::Contrato, "Contratos", "file-text"),
    route("/consultores", Module::Consultor, "Consultores", "briefcase"),
    route("/parceiros", Module::Parceiro, "Parceiros", "handshake"),
    route("/boletos", Module::Boleto, "Boletos", "receipt"),
    route("/pessoas-fisicas", Module::PessoaFisica, "Pessoas Físicas", "user"),
    route("/pessoas-juridicas", Module::PessoaJuridica, "Pessoas Jurídicas", "building-2"),
    route("/filiais", Module::Filial, "Filiais", "building"),
    route("/usuarios", Module::Usuario, "Usuários", "user-cog"),
    route("/grupos-acesso", Module::GrupoAcesso, "Grupos de Acesso", "shield"),
];

const fn route(
    path: &'static str,
    module: Module,
    label: &'static str,
    icon: &'static str,
) -> RouteDescriptor {
    RouteDescriptor {
        path,
        module,
        action: Action::Visualizar,
        label,
        icon,
    }
}

/// Módulo -> Tela. Função total: todo módulo tem exatamente uma tela.
pub fn screen_for(module: Module) -> &'static str {
    match module {
        Module::Cliente => SCREEN_CLIENTES,
        Module::Contrato => SCREEN_CONTRATOS,
        Module::Consultor => SCREEN_CONSULTORES,
        Module::Parceiro => SCREEN_PARCEIROS,
        Module::Boleto => SCREEN_BOLETOS,
        Module::Usuario => SCREEN_USUARIOS,
        Module::Filial => SCREEN_FILIAIS,
        Module::GrupoAcesso => SCREEN_GRUPOS_ACESSO,
        Module::PessoaFisica | Module::PessoaJuridica => SCREEN_PESSOAS,
    }
}

pub fn category_for(module: Module) -> RouteCategory {
    match module {
        Module::Cliente
        | Module::PessoaFisica
        | Module::PessoaJuridica
        | Module::Parceiro
        | Module::Consultor => RouteCategory::Cadastros,
        Module::Contrato | Module::Filial => RouteCategory::Gestao,
        Module::Boleto => RouteCategory::Financeiro,
        Module::Usuario | Module::GrupoAcesso => RouteCategory::Administracao,
    }
}

// Prioridade no menu principal. Quem não está aqui vai para o fim.
const MENU_PRIORITY: [(Module, u8); 8] = [
    (Module::Cliente, 1),
    (Module::Contrato, 2),
    (Module::Boleto, 3),
    (Module::Consultor, 4),
    (Module::Parceiro, 5),
    (Module::PessoaFisica, 6),
    (Module::PessoaJuridica, 7),
    (Module::Filial, 8),
];

pub fn menu_priority(module: Module) -> Option<u8> {
    MENU_PRIORITY
        .iter()
        .find(|(m, _)| *m == module)
        .map(|(_, p)| *p)
}
