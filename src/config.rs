// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        store::{InventoryStore, TenantStore, UserStore},
        InventoryRepository, TenantRepository, UserRepository,
    },
    services::{
        auth::AuthService, feature_service::FeatureService, inventory_service::InventoryService,
        password::PasswordHasher, token::TokenIssuer,
    },
};

const MIN_SECRET_LEN: usize = 32;

// Configurações do JWT
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_hours: i64,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub jwt: JwtSettings,
}

impl Settings {
    /// Lê as variáveis de ambiente (depois de carregar o `.env`, se existir).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        let secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        if secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET deve ter pelo menos {MIN_SECRET_LEN} bytes");
        }

        let expiration_hours = match lookup("JWT_EXPIRATION_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("JWT_EXPIRATION_HOURS inválido: {raw}"))?,
            None => 24,
        };
        if expiration_hours <= 0 {
            bail!("JWT_EXPIRATION_HOURS deve ser positivo");
        }

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {raw}"))?,
            None => 5,
        };

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            jwt: JwtSettings {
                secret,
                issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "InventoryApi".to_string()),
                audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "InventoryClient".to_string()),
                expiration_hours,
            },
        })
    }
}

/// Conecta ao banco de dados, usando '?' para propagar erros.
pub async fn connect_database(settings: &Settings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&settings.database_url)
        .await?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

// O estado compartilhado que será acessível em toda a aplicação.
// Tudo aqui é compartilhado; o TenantContext é que é por requisição.
#[derive(Clone)]
pub struct AppState {
    pub tenant_store: Arc<dyn TenantStore>,
    pub token_issuer: TokenIssuer,
    pub auth_service: AuthService,
    pub inventory_service: InventoryService,
    pub feature_service: FeatureService,
}

impl AppState {
    // --- Monta o gráfico de dependências sobre o Postgres ---
    pub fn from_pool(db_pool: PgPool, jwt: &JwtSettings) -> Self {
        Self::with_stores(
            Arc::new(TenantRepository::new(db_pool.clone())),
            Arc::new(UserRepository::new(db_pool.clone())),
            Arc::new(InventoryRepository::new(db_pool)),
            jwt,
        )
    }

    // Mesmo gráfico sobre qualquer implementação dos stores (ex.: MemoryStore)
    pub fn with_stores(
        tenant_store: Arc<dyn TenantStore>,
        user_store: Arc<dyn UserStore>,
        inventory_store: Arc<dyn InventoryStore>,
        jwt: &JwtSettings,
    ) -> Self {
        let token_issuer = TokenIssuer::new(jwt);
        let auth_service = AuthService::new(
            tenant_store.clone(),
            user_store,
            PasswordHasher::new(),
            token_issuer.clone(),
        );
        let inventory_service = InventoryService::new(inventory_store);
        let feature_service = FeatureService::new(tenant_store.clone());

        Self {
            tenant_store,
            token_issuer,
            auth_service,
            inventory_service,
            feature_service,
        }
    }
}
