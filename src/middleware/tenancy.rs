// src/middleware/tenancy.rs

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, db::store::TenantStore, models::auth::Claims};

// O contexto do tenant da requisição atual.
// Construído uma única vez (no guard de autenticação) e passado por valor
// para cada chamada do livro-razão e do FeatureService.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TenantContext(Option<i32>);

impl TenantContext {
    pub fn unresolved() -> Self {
        Self(None)
    }

    pub fn resolved(tenant_id: i32) -> Self {
        Self(Some(tenant_id))
    }

    pub fn tenant_id(&self) -> Option<i32> {
        self.0
    }

    /// O tenant resolvido, ou `TenantNotResolved`. Nunca cai num "todos" ou "zero".
    pub fn require(&self) -> Result<i32, AppError> {
        self.0.ok_or(AppError::TenantNotResolved)
    }
}

/// Resolve o tenant a partir das claims já validadas.
/// Só devolve contexto resolvido se o tenant existir e continuar ativo.
pub async fn resolve_tenant(claims: &Claims, tenants: &dyn TenantStore) -> Result<TenantContext, AppError> {
    let Some(tenant_id) = claims.tenant_id() else {
        return Ok(TenantContext::unresolved());
    };

    match tenants.find_active_tenant(tenant_id).await? {
        Some(tenant) => Ok(TenantContext::resolved(tenant.id)),
        None => {
            tracing::warn!(tenant_id, "Token aponta para tenant inexistente ou inativo");
            Ok(TenantContext::unresolved())
        }
    }
}

// Extrator: lê o contexto que o guard colocou nas extensions.
// Sem guard, o contexto fica não resolvido e o serviço é quem recusa.
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<TenantContext>().copied().unwrap_or_default())
    }
}
