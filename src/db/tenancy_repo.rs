// src/db/tenancy_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{common::error::AppError, db::store::TenantStore, models::tenancy::Tenant};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for TenantRepository {
    async fn find_active_tenants_by_subdomain(&self, subdomain: &str) -> Result<Vec<Tenant>, AppError> {
        // lower() = lower() em vez de ILIKE: '%' e '_' no subdomínio não viram curinga.
        // LIMIT 2 basta para detectar ambiguidade.
        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, subdomain, is_active
            FROM tenants
            WHERE is_active = true AND lower(subdomain) = lower($1)
            LIMIT 2
            "#,
        )
            .bind(subdomain)
            .fetch_all(&self.pool)
            .await?;

        Ok(tenants)
    }

    async fn find_active_tenant(&self, tenant_id: i32) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "SELECT id, name, subdomain, is_active FROM tenants WHERE id = $1 AND is_active = true",
        )
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tenant)
    }

    async fn is_module_enabled(&self, tenant_id: i32, module_key: &str) -> Result<bool, AppError> {
        let enabled = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM tenant_modules tm
                JOIN modules m ON m.id = tm.module_id
                WHERE tm.tenant_id = $1
                  AND tm.is_enabled = true
                  AND m.is_active = true
                  AND m.key = $2
            )
            "#,
        )
            .bind(tenant_id)
            .bind(module_key)
            .fetch_one(&self.pool)
            .await?;

        Ok(enabled)
    }
}
