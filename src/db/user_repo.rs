// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{common::error::AppError, db::store::UserStore, models::auth::User};

// O repositório de usuários, responsável pelas tabelas 'users' e 'user_roles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    // Busca usuários ativos do tenant pelo e-mail
    async fn find_active_users_by_email(&self, tenant_id: i32, email: &str) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, tenant_id, email, password_hash, is_active
            FROM users
            WHERE tenant_id = $1 AND is_active = true AND lower(email) = lower($2)
            LIMIT 2
            "#,
        )
            .bind(tenant_id)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn find_role_names(&self, tenant_id: i32, user_id: i32) -> Result<Vec<String>, AppError> {
        let roles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id AND r.tenant_id = ur.tenant_id
            WHERE ur.tenant_id = $1 AND ur.user_id = $2
            ORDER BY r.name
            "#,
        )
            .bind(tenant_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(roles)
    }
}
