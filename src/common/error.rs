// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::auth::AuthenticationResult;

// O tipo de erro único da aplicação.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Argumento inválido recebido pelos serviços (quantidade, preço, depósitos...)
    #[error("{0}")]
    InvalidInput(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Produto {0} não encontrado")]
    ProductNotFound(i32),

    #[error("Depósito {0} não encontrado")]
    WarehouseNotFound(i32),

    #[error(
        "Estoque insuficiente para o produto {product_id} no depósito {warehouse_id} (saldo {on_hand}, movimento {requested})"
    )]
    InsufficientStock {
        product_id: i32,
        warehouse_id: i32,
        on_hand: i64,
        requested: i64,
    },

    // A camada chamadora não resolveu o tenant antes de usar o livro-razão.
    // É erro de programação/configuração, nunca de negócio.
    #[error("Tenant não resolvido para a requisição atual")]
    TenantNotResolved,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::ProductNotFound(_) | AppError::WarehouseNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            // Mesmo formato para qualquer causa de falha no login.
            AppError::InvalidCredentials => {
                return (status, Json(AuthenticationResult::failure())).into_response();
            }
            AppError::InvalidToken => {
                json!({ "error": "Token de autenticação inválido ou ausente." })
            }
            e @ (AppError::InvalidInput(_)
            | AppError::ProductNotFound(_)
            | AppError::WarehouseNotFound(_)
            | AppError::InsufficientStock { .. }) => json!({ "error": e.to_string() }),

            // TenantNotResolved, banco, JWT e afins: loga o detalhe e devolve 500 genérico.
            ref e => {
                tracing::error!(error = ?e, "Erro Interno do Servidor: {}", e);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
        };

        (status, Json(body)).into_response()
    }
}
