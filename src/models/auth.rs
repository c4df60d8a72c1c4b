// src/models/auth.rs

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::services::auth::INVALID_CREDENTIALS_MESSAGE;

// Representa um usuário vindo do banco de dados.
// O e-mail é único apenas dentro do tenant.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub tenant_id: i32,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
}

// Chave composta (tenant, usuário, cargo)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub tenant_id: i32,
    pub user_id: i32,
    pub role_id: i32,
}

// Dados para login. Sem `validator` aqui: campo ausente, nulo ou em branco
// cai na mesma rejeição uniforme do serviço.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

// Resultado do login, no formato esperado pelo front-end
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl AuthenticationResult {
    pub fn success(token: String, tenant_id: i32, user_id: i32, email: String, roles: Vec<String>) -> Self {
        Self {
            success: true,
            token: Some(token),
            message: None,
            tenant_id: Some(tenant_id),
            user_id: Some(user_id),
            email: Some(email),
            roles: Some(roles),
        }
    }

    /// Falha de login. Sempre idêntica, qualquer que seja a causa.
    pub fn failure() -> Self {
        Self {
            success: false,
            token: None,
            message: Some(INVALID_CREDENTIALS_MESSAGE.to_string()),
            tenant_id: None,
            user_id: None,
            email: None,
            roles: None,
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT.
// Os nomes são contrato com os clientes: não renomear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // ID do usuário, em texto
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub email: String,
    pub jti: String, // ID único do token (auditoria/revogação)
    #[serde(default, deserialize_with = "one_or_many")]
    pub role: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }

    pub fn tenant_id(&self) -> Option<i32> {
        self.tenant_id.parse().ok()
    }
}

// Um único cargo pode chegar como string em vez de array
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}

// Resposta de /api/users/me
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user_id: Option<i32>,
    pub tenant_id: Option<i32>,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<&Claims> for CurrentUser {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id(),
            tenant_id: claims.tenant_id(),
            email: claims.email.clone(),
            roles: claims.role.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_json(role: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "sub": "7", "tenantId": "3", "email": "a@b.c", "jti": "x",
            "role": role, "iss": "i", "aud": "a", "iat": 0, "nbf": 0, "exp": 1
        })
    }

    #[test]
    fn role_claim_accepts_single_string() {
        let claims: Claims = serde_json::from_value(claims_json("Admin".into())).unwrap();
        assert_eq!(claims.role, vec!["Admin".to_string()]);
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.tenant_id(), Some(3));
    }

    #[test]
    fn role_claim_accepts_array() {
        let claims: Claims =
            serde_json::from_value(claims_json(serde_json::json!(["Admin", "Seller"]))).unwrap();
        assert_eq!(claims.role.len(), 2);
    }

    #[test]
    fn failure_result_only_carries_the_message() {
        let value = serde_json::to_value(AuthenticationResult::failure()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(value["success"], false);
    }

    #[test]
    fn login_payload_tolerates_missing_and_null_fields() {
        let payload: LoginPayload =
            serde_json::from_value(serde_json::json!({ "subdomain": "acme", "email": null })).unwrap();
        assert_eq!(payload.subdomain.as_deref(), Some("acme"));
        assert!(payload.email.is_none());
        assert!(payload.password.is_none());
    }
}
