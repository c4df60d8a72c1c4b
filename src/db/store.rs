// src/db/store.rs

// ---
// A fronteira de armazenamento.
// ---
// Todo método que toca linhas de um tenant recebe o tenant_id explicitamente.
// Não existe filtro global: cada consulta carrega o seu próprio `tenant_id = $1`.

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        inventory::{NewStockMovement, StockMovement},
        tenancy::Tenant,
    },
};

#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Tenants ativos cujo subdomínio bate (sem diferenciar maiúsculas).
    /// Devolve todos os encontrados para que o chamador detecte ambiguidade.
    async fn find_active_tenants_by_subdomain(&self, subdomain: &str) -> Result<Vec<Tenant>, AppError>;

    async fn find_active_tenant(&self, tenant_id: i32) -> Result<Option<Tenant>, AppError>;

    /// Vínculo existe, está habilitado e o módulo está ativo.
    async fn is_module_enabled(&self, tenant_id: i32, module_key: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_active_users_by_email(&self, tenant_id: i32, email: &str) -> Result<Vec<User>, AppError>;

    /// Nomes distintos dos cargos do usuário dentro do tenant.
    async fn find_role_names(&self, tenant_id: i32, user_id: i32) -> Result<Vec<String>, AppError>;
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn is_product_active(&self, tenant_id: i32, product_id: i32) -> Result<bool, AppError>;

    async fn is_warehouse_active(&self, tenant_id: i32, warehouse_id: i32) -> Result<bool, AppError>;

    /// Soma das quantidades do trio (tenant, produto, depósito). Zero sem linhas.
    async fn stock_on_hand(&self, tenant_id: i32, product_id: i32, warehouse_id: i32) -> Result<i64, AppError>;

    /// O único caminho de escrita do livro-razão.
    ///
    /// Grava todos os movimentos numa única unidade atômica. Para cada movimento
    /// negativo, serializa contra os demais escritores do mesmo trio, relê o saldo
    /// dentro da unidade e falha com `InsufficientStock` se saldo + delta < 0.
    /// Em qualquer falha (ou cancelamento) nenhuma linha fica visível.
    async fn append_movements(
        &self,
        tenant_id: i32,
        movements: Vec<NewStockMovement>,
    ) -> Result<Vec<StockMovement>, AppError>;

    /// Histórico do produto, do mais antigo para o mais novo.
    async fn list_movements(
        &self,
        tenant_id: i32,
        product_id: i32,
        warehouse_id: Option<i32>,
    ) -> Result<Vec<StockMovement>, AppError>;
}
