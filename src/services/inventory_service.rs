// src/services/inventory_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::store::InventoryStore,
    middleware::tenancy::TenantContext,
    models::inventory::{MovementKind, NewStockMovement, StockMovement, TransferPair},
};

const MAX_NOTES_LEN: usize = 1000;
const PRICE_SCALE: u32 = 2;
// 10^16: o limite de 16 dígitos inteiros de NUMERIC(18, 2)
const MAX_PRICE_EXCLUSIVE: i64 = 10_000_000_000_000_000;

// O livro-razão de estoque.
// Não existe contador de saldo: o saldo é sempre a soma das movimentações.
#[derive(Clone)]
pub struct InventoryService {
    inventory_store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(inventory_store: Arc<dyn InventoryStore>) -> Self {
        Self { inventory_store }
    }

    // ---
    // Leitura
    // ---

    pub async fn stock_on_hand(&self, ctx: &TenantContext, product_id: i32, warehouse_id: i32) -> Result<i64, AppError> {
        let tenant_id = ctx.require()?;
        self.inventory_store
            .stock_on_hand(tenant_id, product_id, warehouse_id)
            .await
    }

    pub async fn movements(
        &self,
        ctx: &TenantContext,
        product_id: i32,
        warehouse_id: Option<i32>,
    ) -> Result<Vec<StockMovement>, AppError> {
        let tenant_id = ctx.require()?;
        self.require_product(tenant_id, product_id).await?;
        if let Some(warehouse_id) = warehouse_id {
            self.require_warehouse(tenant_id, warehouse_id).await?;
        }

        self.inventory_store
            .list_movements(tenant_id, product_id, warehouse_id)
            .await
    }

    // ---
    // Escrita. A verificação de saldo acontece dentro da unidade atômica
    // do store (append_movements), nunca com um saldo lido antes.
    // ---

    // --- COMPRA (ENTRADA) ---
    pub async fn record_purchase(
        &self,
        ctx: &TenantContext,
        product_id: i32,
        warehouse_id: i32,
        quantity: i32,
        unit_price: Decimal,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError> {
        require_positive(quantity, "quantity")?;
        require_price(unit_price, "unitPrice")?;
        require_notes(notes)?;

        let tenant_id = ctx.require()?;
        self.require_product(tenant_id, product_id).await?;
        self.require_warehouse(tenant_id, warehouse_id).await?;

        let movement = NewStockMovement {
            product_id,
            warehouse_id,
            kind: MovementKind::Purchase,
            quantity,
            unit_price,
            notes: notes.map(str::to_owned),
            related_warehouse_id: None,
        };

        self.append_one(tenant_id, movement).await
    }

    // --- VENDA (SAÍDA) ---
    pub async fn record_sale(
        &self,
        ctx: &TenantContext,
        product_id: i32,
        warehouse_id: i32,
        quantity: i32,
        unit_price: Decimal,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError> {
        require_positive(quantity, "quantity")?;
        require_price(unit_price, "unitPrice")?;
        require_notes(notes)?;

        let tenant_id = ctx.require()?;
        self.require_product(tenant_id, product_id).await?;
        self.require_warehouse(tenant_id, warehouse_id).await?;

        let movement = NewStockMovement {
            product_id,
            warehouse_id,
            kind: MovementKind::Sale,
            quantity: -quantity,
            unit_price,
            notes: notes.map(str::to_owned),
            related_warehouse_id: None,
        };

        self.append_one(tenant_id, movement).await
    }

    // --- AJUSTE (delta com sinal) ---
    pub async fn record_adjustment(
        &self,
        ctx: &TenantContext,
        product_id: i32,
        warehouse_id: i32,
        quantity_delta: i32,
        unit_price: Decimal,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError> {
        if quantity_delta == 0 {
            return Err(AppError::InvalidInput("quantityDelta deve ser diferente de zero.".into()));
        }
        require_price(unit_price, "unitPrice")?;
        require_notes(notes)?;

        let tenant_id = ctx.require()?;
        self.require_product(tenant_id, product_id).await?;
        self.require_warehouse(tenant_id, warehouse_id).await?;

        // Delta negativo passa pela mesma verificação de saldo da venda
        let movement = NewStockMovement {
            product_id,
            warehouse_id,
            kind: MovementKind::Adjustment,
            quantity: quantity_delta,
            unit_price,
            notes: notes.map(str::to_owned),
            related_warehouse_id: None,
        };

        self.append_one(tenant_id, movement).await
    }

    // --- TRANSFERÊNCIA (par saída/entrada, tudo ou nada) ---
    pub async fn record_transfer(
        &self,
        ctx: &TenantContext,
        product_id: i32,
        from_warehouse_id: i32,
        to_warehouse_id: i32,
        quantity: i32,
        unit_price: Decimal,
        notes: Option<&str>,
    ) -> Result<TransferPair, AppError> {
        require_positive(quantity, "quantity")?;
        require_price(unit_price, "unitPrice")?;
        require_notes(notes)?;
        if from_warehouse_id == to_warehouse_id {
            return Err(AppError::InvalidInput(
                "Os depósitos de origem e destino devem ser diferentes.".into(),
            ));
        }

        let tenant_id = ctx.require()?;
        self.require_product(tenant_id, product_id).await?;
        self.require_warehouse(tenant_id, from_warehouse_id).await?;
        self.require_warehouse(tenant_id, to_warehouse_id).await?;

        let outbound = NewStockMovement {
            product_id,
            warehouse_id: from_warehouse_id,
            kind: MovementKind::Transfer,
            quantity: -quantity,
            unit_price,
            notes: notes.map(str::to_owned),
            related_warehouse_id: Some(to_warehouse_id),
        };
        let inbound = NewStockMovement {
            product_id,
            warehouse_id: to_warehouse_id,
            kind: MovementKind::Transfer,
            quantity,
            unit_price,
            notes: notes.map(str::to_owned),
            related_warehouse_id: Some(from_warehouse_id),
        };

        let mut recorded = self
            .inventory_store
            .append_movements(tenant_id, vec![outbound, inbound])
            .await?
            .into_iter();

        let (Some(outbound), Some(inbound)) = (recorded.next(), recorded.next()) else {
            return Err(anyhow::anyhow!("Transferência gravou um número inesperado de movimentos").into());
        };

        tracing::info!(
            tenant_id,
            product_id,
            from_warehouse_id,
            to_warehouse_id,
            quantity,
            "Transferência registrada"
        );
        Ok(TransferPair { outbound, inbound })
    }

    // ---
    // Helpers
    // ---

    async fn append_one(&self, tenant_id: i32, movement: NewStockMovement) -> Result<StockMovement, AppError> {
        let recorded = self
            .inventory_store
            .append_movements(tenant_id, vec![movement])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Nenhum movimento foi gravado"))?;

        tracing::info!(
            tenant_id,
            product_id = recorded.product_id,
            warehouse_id = recorded.warehouse_id,
            kind = ?recorded.kind,
            quantity = recorded.quantity,
            "Movimentação registrada"
        );
        Ok(recorded)
    }

    async fn require_product(&self, tenant_id: i32, product_id: i32) -> Result<(), AppError> {
        if !self.inventory_store.is_product_active(tenant_id, product_id).await? {
            return Err(AppError::ProductNotFound(product_id));
        }
        Ok(())
    }

    async fn require_warehouse(&self, tenant_id: i32, warehouse_id: i32) -> Result<(), AppError> {
        if !self.inventory_store.is_warehouse_active(tenant_id, warehouse_id).await? {
            return Err(AppError::WarehouseNotFound(warehouse_id));
        }
        Ok(())
    }
}

fn require_positive(value: i32, field: &str) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::InvalidInput(format!("{field} deve ser positivo.")));
    }
    Ok(())
}

// Cabe em NUMERIC(18, 2) sem arredondar: os dois stores guardam o mesmo valor
fn require_price(value: Decimal, field: &str) -> Result<(), AppError> {
    if value < Decimal::ZERO {
        return Err(AppError::InvalidInput(format!("{field} não pode ser negativo.")));
    }
    if value.normalize().scale() > PRICE_SCALE {
        return Err(AppError::InvalidInput(format!(
            "{field} deve ter no máximo {PRICE_SCALE} casas decimais."
        )));
    }
    if value >= Decimal::from(MAX_PRICE_EXCLUSIVE) {
        return Err(AppError::InvalidInput(format!("{field} excede o valor máximo permitido.")));
    }
    Ok(())
}

fn require_notes(notes: Option<&str>) -> Result<(), AppError> {
    if notes.is_some_and(|n| n.chars().count() > MAX_NOTES_LEN) {
        return Err(AppError::InvalidInput(format!(
            "notes deve ter no máximo {MAX_NOTES_LEN} caracteres."
        )));
    }
    Ok(())
}
