use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// SQLSTATE usado pelo RAISE EXCEPTION das funções de status
const PG_RAISE_EXCEPTION: &str = "P0001";
// SQLSTATE no_data_found
const PG_NO_DATA_FOUND: &str = "P0002";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Registro duplicado: {0}")]
    UniqueConstraintViolation(String),

    /// Regra de negócio recusada (ex.: transição de status inválida).
    #[error("Operação não permitida: {0}")]
    BusinessRule(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[source] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Mensagem para o cliente; o texto do Postgres fica só no log.
fn mensagem_duplicidade(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("uq_calculo_template_padrao") => {
            "Já existe um template padrão. Tente novamente."
        }
        _ => "Já existe um registro com esses dados.",
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                tracing::warn!("Violação de unicidade não tratada no repositório: {}", db_err.message());
                return AppError::UniqueConstraintViolation(
                    mensagem_duplicidade(db_err.constraint()).to_string(),
                );
            }
            match db_err.code().as_deref() {
                Some(PG_RAISE_EXCEPTION) => {
                    return AppError::BusinessRule(db_err.message().to_string());
                }
                Some(PG_NO_DATA_FOUND) => {
                    return AppError::ResourceNotFound(db_err.message().to_string());
                }
                _ => {}
            }
        }
        AppError::DatabaseError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidToken | AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::ResourceNotFound(what) => (StatusCode::NOT_FOUND, what),
            AppError::UniqueConstraintViolation(msg) => (StatusCode::CONFLICT, msg),
            AppError::BusinessRule(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),

            // Todo o resto vira 500, com o detalhe só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rule_maps_to_unprocessable_entity() {
        let response = AppError::BusinessRule("Transição inválida".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_resource_maps_to_not_found() {
        let response = AppError::ResourceNotFound("Fatura".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_messages_do_not_leak_database_text() {
        assert_eq!(
            mensagem_duplicidade(Some("uq_calculo_template_padrao")),
            "Já existe um template padrão. Tente novamente."
        );
        for constraint in [None, Some("cooperados_documento_key")] {
            let msg = mensagem_duplicidade(constraint);
            assert_eq!(msg, "Já existe um registro com esses dados.");
            assert!(!msg.contains("duplicate key"));
        }

        let response = AppError::UniqueConstraintViolation(
            mensagem_duplicidade(None).to_string(),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unexpected_errors_are_hidden_behind_500() {
        let response = AppError::InternalServerError(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::from(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
