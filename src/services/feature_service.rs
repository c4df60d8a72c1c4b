// src/services/feature_service.rs

use std::sync::Arc;

use crate::{common::error::AppError, db::store::TenantStore, middleware::tenancy::TenantContext};

// Liga/desliga de módulos opcionais por tenant
#[derive(Clone)]
pub struct FeatureService {
    tenant_store: Arc<dyn TenantStore>,
}

impl FeatureService {
    pub fn new(tenant_store: Arc<dyn TenantStore>) -> Self {
        Self { tenant_store }
    }

    /// Para o tenant da requisição. Sem tenant resolvido é erro, não `false`.
    pub async fn is_enabled(&self, ctx: &TenantContext, module_key: &str) -> Result<bool, AppError> {
        let tenant_id = ctx.require()?;
        self.is_enabled_for(tenant_id, module_key).await
    }

    /// Chave com espaços nas pontas é aparada; a comparação diferencia maiúsculas.
    pub async fn is_enabled_for(&self, tenant_id: i32, module_key: &str) -> Result<bool, AppError> {
        let module_key = module_key.trim();
        if module_key.is_empty() {
            return Ok(false);
        }

        self.tenant_store.is_module_enabled(tenant_id, module_key).await
    }
}
