// src/services/classifier.rs
//
// Classificação de falhas do backend. Só muda o nível do log: qualquer classe
// termina no mesmo valor seguro.

use crate::backend::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Sessão ausente, expirada ou token inválido.
    Unauthenticated,
    /// Usuário autenticado, mas sem direito.
    AuthorizationDenied,
    /// Rede, timeout, 5xx, corpo malformado.
    Transient,
}

impl ErrorClass {
    /// Falha "esperada" (sessão/permissão) vs inesperada.
    pub fn is_expected(&self) -> bool {
        !matches!(self, ErrorClass::Transient)
    }
}

pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &BackendError) -> ErrorClass;
}

const UNAUTHENTICATED_CODES: [&str; 3] = ["SESSION_EXPIRED", "NOT_AUTHENTICATED", "INVALID_TOKEN"];
const DENIED_CODES: [&str; 4] = ["PERMISSION_DENIED", "FORBIDDEN", "USER_NOT_FOUND", "NO_GROUP"];

/// Status HTTP, depois código explícito, por último palavras-chave.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorClassifier;

impl ErrorClassifier for DefaultErrorClassifier {
    fn classify(&self, error: &BackendError) -> ErrorClass {
        match error.status_code() {
            Some(401) => return ErrorClass::Unauthenticated,
            Some(403) => return ErrorClass::AuthorizationDenied,
            _ => {}
        }

        if let Some(code) = error.code() {
            let code = code.to_ascii_uppercase();
            if UNAUTHENTICATED_CODES.contains(&code.as_str()) {
                return ErrorClass::Unauthenticated;
            }
            if DENIED_CODES.contains(&code.as_str()) {
                return ErrorClass::AuthorizationDenied;
            }
        }

        match error {
            // Só respostas do próprio backend carregam mensagem de negócio
            BackendError::Status { message, .. } => {
                keyword_heuristic(message).unwrap_or(ErrorClass::Transient)
            }
            _ => ErrorClass::Transient,
        }
    }
}

const SESSION_KEYWORDS: [&str; 7] = [
    "session",
    "sessão",
    "sessao",
    "token",
    "not authenticated",
    "não autenticado",
    "login",
];

const PERMISSION_KEYWORDS: [&str; 12] = [
    "permission",
    "permissão",
    "permissao",
    "unauthorized",
    "não autorizado",
    "nao autorizado",
    "forbidden",
    "proibido",
    "access denied",
    "acesso negado",
    "user not found",
    "usuário não encontrado",
];

/// Heurística por palavra-chave (pt/en). Último recurso, sensível a tradução.
pub fn keyword_heuristic(message: &str) -> Option<ErrorClass> {
    let lower = message.to_lowercase();

    if SESSION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(ErrorClass::Unauthenticated);
    }
    if PERMISSION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(ErrorClass::AuthorizationDenied);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, code: Option<&str>, message: &str) -> BackendError {
        BackendError::Status {
            status,
            code: code.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn heuristic_matches_portuguese_and_english() {
        assert_eq!(keyword_heuristic("Sessão expirada"), Some(ErrorClass::Unauthenticated));
        assert_eq!(keyword_heuristic("Invalid TOKEN"), Some(ErrorClass::Unauthenticated));
        assert_eq!(keyword_heuristic("Acesso negado ao módulo"), Some(ErrorClass::AuthorizationDenied));
        assert_eq!(keyword_heuristic("Usuário não encontrado"), Some(ErrorClass::AuthorizationDenied));
        assert_eq!(keyword_heuristic("Forbidden"), Some(ErrorClass::AuthorizationDenied));
        assert_eq!(keyword_heuristic("connection reset by peer"), None);
    }

    #[test]
    fn status_code_beats_message() {
        let c = DefaultErrorClassifier;

        assert_eq!(c.classify(&status(401, None, "qualquer coisa")), ErrorClass::Unauthenticated);
        assert_eq!(c.classify(&status(403, None, "session")), ErrorClass::AuthorizationDenied);
    }

    #[test]
    fn explicit_code_beats_keywords() {
        let c = DefaultErrorClassifier;
        let e = status(400, Some("permission_denied"), "session lost");

        assert_eq!(c.classify(&e), ErrorClass::AuthorizationDenied);
    }

    #[test]
    fn transport_failures_are_transient_even_with_keywords() {
        let c = DefaultErrorClassifier;

        assert_eq!(c.classify(&BackendError::Timeout("session timeout".into())), ErrorClass::Transient);
        assert_eq!(c.classify(&BackendError::InvalidResponse("eof".into())), ErrorClass::Transient);
        assert_eq!(c.classify(&status(500, None, "NullReferenceException")), ErrorClass::Transient);
        assert!(!ErrorClass::Transient.is_expected());
    }

    #[test]
    fn server_message_with_keyword_is_expected() {
        let c = DefaultErrorClassifier;
        let class = c.classify(&status(500, None, "Usuário sem permissão"));

        assert_eq!(class, ErrorClass::AuthorizationDenied);
        assert!(class.is_expected());
    }
}
