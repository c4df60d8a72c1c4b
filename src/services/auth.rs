// src/services/auth.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::store::{TenantStore, UserStore},
    models::auth::AuthenticationResult,
    services::{password::PasswordHasher, token::TokenIssuer},
};

/// Mensagem única para toda falha de login (não revela qual campo falhou).
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Credenciais inválidas.";

#[derive(Clone)]
pub struct AuthService {
    tenant_store: Arc<dyn TenantStore>,
    user_store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    token_issuer: TokenIssuer,
    // Derivado quando não há usuário, para o tempo de resposta não denunciar e-mails
    decoy_hash: String,
}

impl AuthService {
    pub fn new(
        tenant_store: Arc<dyn TenantStore>,
        user_store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        token_issuer: TokenIssuer,
    ) -> Self {
        let decoy_hash = hasher.decoy_hash();
        Self { tenant_store, user_store, hasher, token_issuer, decoy_hash }
    }

    /// Subdomínio + e-mail + senha -> token assinado.
    ///
    /// Toda rejeição devolve `AppError::InvalidCredentials`, sempre igual para o
    /// chamador. A causa só aparece no log. Erros de infraestrutura (banco)
    /// continuam sendo propagados como tal.
    pub async fn login(&self, subdomain: &str, email: &str, password: &str) -> Result<AuthenticationResult, AppError> {
        // 1. Entrada
        let subdomain = subdomain.trim();
        let email = email.trim();
        if subdomain.is_empty() || email.is_empty() || password.trim().is_empty() {
            return Err(reject("campos em branco"));
        }

        // 2. Tenant: exatamente um ativo
        let mut tenants = self.tenant_store.find_active_tenants_by_subdomain(subdomain).await?;
        if tenants.len() > 1 {
            tracing::error!(subdomain, "Subdomínio ambíguo: mais de um tenant ativo");
        }
        let tenant = match (tenants.pop(), tenants.is_empty()) {
            (Some(tenant), true) => Some(tenant),
            _ => None,
        };

        // 3. Usuário ativo dentro do tenant
        let user = match &tenant {
            Some(tenant) => {
                let mut users = self.user_store.find_active_users_by_email(tenant.id, email).await?;
                match (users.pop(), users.is_empty()) {
                    (Some(user), true) => Some(user),
                    _ => None,
                }
            }
            None => None,
        };

        // 4. Senha (PBKDF2 é caro: roda fora do executor).
        // Sem usuário, deriva contra o decoy: todo caminho de rejeição custa o mesmo.
        let hasher = self.hasher;
        let password_clone = password.to_owned();
        let password_hash_clone = user
            .as_ref()
            .map_or_else(|| self.decoy_hash.clone(), |user| user.password_hash.clone());
        let is_password_valid = tokio::task::spawn_blocking(move || {
            hasher.verify(&password_hash_clone, &password_clone)
        })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?;

        let Some(tenant) = tenant else {
            return Err(reject("tenant não encontrado"));
        };
        let Some(user) = user else {
            return Err(reject("usuário não encontrado"));
        };
        if !is_password_valid {
            return Err(reject("senha incorreta"));
        }

        // 5. Cargos distintos
        let roles: Vec<String> = self
            .user_store
            .find_role_names(tenant.id, user.id)
            .await?
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // 6. Token
        let token = self.token_issuer.issue(user.id, tenant.id, &user.email, &roles)?;

        tracing::info!(tenant_id = tenant.id, user_id = user.id, "Login realizado");
        Ok(AuthenticationResult::success(token, tenant.id, user.id, user.email, roles))
    }
}

fn reject(reason: &str) -> AppError {
    tracing::warn!(reason, "Login rejeitado");
    AppError::InvalidCredentials
}
