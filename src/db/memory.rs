// src/db/memory.rs

//! Armazenamento em memória com a mesma semântica dos repositórios Postgres.
//!
//! Usado pelos testes de integração e para subir a API sem banco.
//! Todas as tabelas ficam atrás de um único `tokio::sync::Mutex`: em
//! `append_movements` a verificação e o push acontecem sob a mesma guarda,
//! sem nenhum `.await` no meio, então um cancelamento nunca deixa escrita parcial.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    db::store::{InventoryStore, TenantStore, UserStore},
    models::{
        auth::{Role, User, UserRole},
        inventory::{NewStockMovement, Product, StockMovement, Warehouse},
        tenancy::{Module, Tenant, TenantModule},
    },
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i32,
    next_movement_id: i64,
    tenants: Vec<Tenant>,
    users: Vec<User>,
    roles: Vec<Role>,
    user_roles: Vec<UserRole>,
    products: Vec<Product>,
    warehouses: Vec<Warehouse>,
    modules: Vec<Module>,
    tenant_modules: Vec<TenantModule>,
    movements: Vec<StockMovement>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn on_hand(&self, tenant_id: i32, product_id: i32, warehouse_id: i32) -> i64 {
        self.movements
            .iter()
            .filter(|m| m.tenant_id == tenant_id && m.product_id == product_id && m.warehouse_id == warehouse_id)
            .map(|m| i64::from(m.quantity))
            .sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---
    // Carga de dados (o CRUD que vive fora do livro-razão)
    // ---

    pub async fn add_tenant(&self, name: &str, subdomain: &str) -> i32 {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.tenants.push(Tenant {
            id,
            name: name.to_string(),
            subdomain: subdomain.to_string(),
            is_active: true,
        });
        id
    }

    pub async fn set_tenant_active(&self, tenant_id: i32, active: bool) {
        let mut tables = self.tables.lock().await;
        if let Some(tenant) = tables.tenants.iter_mut().find(|t| t.id == tenant_id) {
            tenant.is_active = active;
        }
    }

    pub async fn add_user(&self, tenant_id: i32, email: &str, password_hash: &str) -> i32 {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.users.push(User {
            id,
            tenant_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
        });
        id
    }

    pub async fn set_user_active(&self, user_id: i32, active: bool) {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.is_active = active;
        }
    }

    pub async fn add_role(&self, tenant_id: i32, name: &str) -> i32 {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.roles.push(Role { id, tenant_id, name: name.to_string() });
        id
    }

    pub async fn assign_role(&self, tenant_id: i32, user_id: i32, role_id: i32) {
        let mut tables = self.tables.lock().await;
        tables.user_roles.push(UserRole { tenant_id, user_id, role_id });
    }

    pub async fn add_product(&self, tenant_id: i32, sku: &str, price: Decimal) -> i32 {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.products.push(Product {
            id,
            tenant_id,
            sku: sku.to_string(),
            name: sku.to_string(),
            price,
            minimum_stock: 0,
            is_active: true,
        });
        id
    }

    pub async fn set_product_active(&self, product_id: i32, active: bool) {
        let mut tables = self.tables.lock().await;
        if let Some(product) = tables.products.iter_mut().find(|p| p.id == product_id) {
            product.is_active = active;
        }
    }

    pub async fn add_warehouse(&self, tenant_id: i32, name: &str) -> i32 {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.warehouses.push(Warehouse {
            id,
            tenant_id,
            name: name.to_string(),
            is_active: true,
        });
        id
    }

    pub async fn set_warehouse_active(&self, warehouse_id: i32, active: bool) {
        let mut tables = self.tables.lock().await;
        if let Some(warehouse) = tables.warehouses.iter_mut().find(|w| w.id == warehouse_id) {
            warehouse.is_active = active;
        }
    }

    pub async fn add_module(&self, key: &str, active: bool) -> i32 {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.modules.push(Module {
            id,
            key: key.to_string(),
            name: key.to_string(),
            description: None,
            is_active: active,
        });
        id
    }

    /// Cria ou atualiza o vínculo tenant-módulo.
    pub async fn set_tenant_module(&self, tenant_id: i32, module_id: i32, enabled: bool) {
        let mut tables = self.tables.lock().await;
        if let Some(link) = tables
            .tenant_modules
            .iter_mut()
            .find(|tm| tm.tenant_id == tenant_id && tm.module_id == module_id)
        {
            link.is_enabled = enabled;
            return;
        }
        let id = tables.next_id();
        tables.tenant_modules.push(TenantModule {
            id,
            tenant_id,
            module_id,
            is_enabled: enabled,
        });
    }

    /// Todas as movimentações de todos os tenants (visão da tabela compartilhada).
    pub async fn all_movements(&self) -> Vec<StockMovement> {
        self.tables.lock().await.movements.clone()
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn find_active_tenants_by_subdomain(&self, subdomain: &str) -> Result<Vec<Tenant>, AppError> {
        let tables = self.tables.lock().await;
        let needle = subdomain.to_lowercase();
        Ok(tables
            .tenants
            .iter()
            .filter(|t| t.is_active && t.subdomain.to_lowercase() == needle)
            .cloned()
            .collect())
    }

    async fn find_active_tenant(&self, tenant_id: i32) -> Result<Option<Tenant>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tenants
            .iter()
            .find(|t| t.id == tenant_id && t.is_active)
            .cloned())
    }

    async fn is_module_enabled(&self, tenant_id: i32, module_key: &str) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.tenant_modules.iter().any(|tm| {
            tm.tenant_id == tenant_id
                && tm.is_enabled
                && tables
                    .modules
                    .iter()
                    .any(|m| m.id == tm.module_id && m.is_active && m.key == module_key)
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_active_users_by_email(&self, tenant_id: i32, email: &str) -> Result<Vec<User>, AppError> {
        let tables = self.tables.lock().await;
        let needle = email.to_lowercase();
        Ok(tables
            .users
            .iter()
            .filter(|u| u.tenant_id == tenant_id && u.is_active && u.email.to_lowercase() == needle)
            .cloned()
            .collect())
    }

    async fn find_role_names(&self, tenant_id: i32, user_id: i32) -> Result<Vec<String>, AppError> {
        let tables = self.tables.lock().await;
        let names: BTreeSet<String> = tables
            .user_roles
            .iter()
            .filter(|ur| ur.tenant_id == tenant_id && ur.user_id == user_id)
            .filter_map(|ur| {
                tables
                    .roles
                    .iter()
                    .find(|r| r.id == ur.role_id && r.tenant_id == tenant_id)
                    .map(|r| r.name.clone())
            })
            .collect();
        Ok(names.into_iter().collect())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn is_product_active(&self, tenant_id: i32, product_id: i32) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .products
            .iter()
            .any(|p| p.id == product_id && p.tenant_id == tenant_id && p.is_active))
    }

    async fn is_warehouse_active(&self, tenant_id: i32, warehouse_id: i32) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .warehouses
            .iter()
            .any(|w| w.id == warehouse_id && w.tenant_id == tenant_id && w.is_active))
    }

    async fn stock_on_hand(&self, tenant_id: i32, product_id: i32, warehouse_id: i32) -> Result<i64, AppError> {
        Ok(self.tables.lock().await.on_hand(tenant_id, product_id, warehouse_id))
    }

    async fn append_movements(
        &self,
        tenant_id: i32,
        movements: Vec<NewStockMovement>,
    ) -> Result<Vec<StockMovement>, AppError> {
        let mut tables = self.tables.lock().await;

        // Valida o lote inteiro antes de gravar, somando os deltas anteriores do próprio lote
        let mut pending: Vec<(i32, i32, i64)> = Vec::new();
        for movement in &movements {
            let delta = i64::from(movement.quantity);
            if delta < 0 {
                let staged: i64 = pending
                    .iter()
                    .filter(|(p, w, _)| *p == movement.product_id && *w == movement.warehouse_id)
                    .map(|(_, _, q)| q)
                    .sum();
                let on_hand = tables.on_hand(tenant_id, movement.product_id, movement.warehouse_id) + staged;
                if on_hand + delta < 0 {
                    return Err(AppError::InsufficientStock {
                        product_id: movement.product_id,
                        warehouse_id: movement.warehouse_id,
                        on_hand,
                        requested: delta,
                    });
                }
            }
            pending.push((movement.product_id, movement.warehouse_id, delta));
        }

        let created_at = Utc::now();
        let mut recorded = Vec::with_capacity(movements.len());
        for movement in movements {
            tables.next_movement_id += 1;
            let row = StockMovement {
                id: tables.next_movement_id,
                tenant_id,
                product_id: movement.product_id,
                warehouse_id: movement.warehouse_id,
                kind: movement.kind,
                quantity: movement.quantity,
                unit_price: movement.unit_price,
                notes: movement.notes,
                related_warehouse_id: movement.related_warehouse_id,
                created_at,
            };
            tables.movements.push(row.clone());
            recorded.push(row);
        }

        Ok(recorded)
    }

    async fn list_movements(
        &self,
        tenant_id: i32,
        product_id: i32,
        warehouse_id: Option<i32>,
    ) -> Result<Vec<StockMovement>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .movements
            .iter()
            .filter(|m| {
                m.tenant_id == tenant_id
                    && m.product_id == product_id
                    && warehouse_id.is_none_or(|w| m.warehouse_id == w)
            })
            .cloned()
            .collect())
    }
}
