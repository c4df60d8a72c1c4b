// Fixture compartilhada dos testes de integração: MemoryStore + AppState completo.
#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use tenant_ledger::{
    config::{AppState, JwtSettings},
    db::MemoryStore,
    middleware::tenancy::TenantContext,
    services::password::PasswordHasher,
};

pub const PASSWORD: &str = "S3nha-forte!";

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-with-32-bytes!!".to_string(),
        issuer: "InventoryApi".to_string(),
        audience: "InventoryClient".to_string(),
        expiration_hours: 24,
    }
}

pub fn app_state(store: &MemoryStore) -> AppState {
    let store = Arc::new(store.clone());
    AppState::with_stores(store.clone(), store.clone(), store, &jwt_settings())
}

// Um tenant com produto, dois depósitos e um usuário.
pub struct Shop {
    pub tenant_id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub w1: i32,
    pub w2: i32,
}

impl Shop {
    pub fn ctx(&self) -> TenantContext {
        TenantContext::resolved(self.tenant_id)
    }
}

pub async fn seed_shop(store: &MemoryStore, subdomain: &str, email: &str) -> Shop {
    let tenant_id = store.add_tenant(subdomain, subdomain).await;
    let hash = PasswordHasher::new().hash(PASSWORD).unwrap();
    let user_id = store.add_user(tenant_id, email, &hash).await;
    let product_id = store.add_product(tenant_id, "P1", Decimal::new(250, 2)).await;
    let w1 = store.add_warehouse(tenant_id, "W1").await;
    let w2 = store.add_warehouse(tenant_id, "W2").await;

    Shop { tenant_id, user_id, product_id, w1, w2 }
}

pub fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
