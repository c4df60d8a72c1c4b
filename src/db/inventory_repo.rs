// src/db/inventory_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    db::store::InventoryStore,
    models::inventory::{NewStockMovement, StockMovement},
};

const MOVEMENT_COLUMNS: &str =
    "id, tenant_id, product_id, warehouse_id, kind, quantity, unit_price, notes, related_warehouse_id, created_at";

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Helpers genéricos: rodam na pool ou dentro de uma transação
    // ---

    async fn sum_quantity<'e, E>(
        executor: E,
        tenant_id: i32,
        product_id: i32,
        warehouse_id: i32,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // SUM(integer) é BIGINT; COALESCE garante 0 sem linhas
        let sum = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::BIGINT
            FROM stock_movements
            WHERE tenant_id = $1 AND product_id = $2 AND warehouse_id = $3
            "#,
        )
            .bind(tenant_id)
            .bind(product_id)
            .bind(warehouse_id)
            .fetch_one(executor)
            .await?;

        Ok(sum)
    }

    /// Lock consultivo do trio, liberado no commit/rollback da transação.
    async fn lock_triple<'e, E>(
        executor: E,
        tenant_id: i32,
        product_id: i32,
        warehouse_id: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2::text || ':' || $3::text))")
            .bind(tenant_id)
            .bind(product_id)
            .bind(warehouse_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    async fn insert_movement<'e, E>(
        executor: E,
        tenant_id: i32,
        movement: &NewStockMovement,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO stock_movements
                (tenant_id, product_id, warehouse_id, kind, quantity, unit_price, notes, related_warehouse_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {MOVEMENT_COLUMNS}
            "#
        );

        let recorded = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(tenant_id)
            .bind(movement.product_id)
            .bind(movement.warehouse_id)
            .bind(movement.kind)
            .bind(movement.quantity)
            .bind(movement.unit_price)
            .bind(movement.notes.as_deref())
            .bind(movement.related_warehouse_id)
            .fetch_one(executor)
            .await?;

        Ok(recorded)
    }
}

#[async_trait]
impl InventoryStore for InventoryRepository {
    async fn is_product_active(&self, tenant_id: i32, product_id: i32) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM products WHERE id = $1 AND tenant_id = $2 AND is_active = true)",
        )
            .bind(product_id)
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn is_warehouse_active(&self, tenant_id: i32, warehouse_id: i32) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM warehouses WHERE id = $1 AND tenant_id = $2 AND is_active = true)",
        )
            .bind(warehouse_id)
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn stock_on_hand(&self, tenant_id: i32, product_id: i32, warehouse_id: i32) -> Result<i64, AppError> {
        Self::sum_quantity(&self.pool, tenant_id, product_id, warehouse_id).await
    }

    async fn append_movements(
        &self,
        tenant_id: i32,
        movements: Vec<NewStockMovement>,
    ) -> Result<Vec<StockMovement>, AppError> {
        // Se o future for descartado antes do commit, o drop da transação faz rollback.
        let mut tx = self.pool.begin().await?;

        // Trava os trios que vão diminuir, sempre na mesma ordem (evita deadlock)
        let mut keys: Vec<(i32, i32)> = movements
            .iter()
            .filter(|m| m.quantity < 0)
            .map(|m| (m.product_id, m.warehouse_id))
            .collect();
        keys.sort_unstable();
        keys.dedup();

        for (product_id, warehouse_id) in &keys {
            Self::lock_triple(&mut *tx, tenant_id, *product_id, *warehouse_id).await?;
        }

        let mut recorded = Vec::with_capacity(movements.len());
        for movement in &movements {
            if movement.quantity < 0 {
                // Lido depois do lock: enxerga os commits anteriores e os inserts desta transação
                let on_hand = Self::sum_quantity(&mut *tx, tenant_id, movement.product_id, movement.warehouse_id)
                    .await?;
                let requested = i64::from(movement.quantity);

                if on_hand + requested < 0 {
                    return Err(AppError::InsufficientStock {
                        product_id: movement.product_id,
                        warehouse_id: movement.warehouse_id,
                        on_hand,
                        requested,
                    });
                }
            }

            recorded.push(Self::insert_movement(&mut *tx, tenant_id, movement).await?);
        }

        tx.commit().await?;
        Ok(recorded)
    }

    async fn list_movements(
        &self,
        tenant_id: i32,
        product_id: i32,
        warehouse_id: Option<i32>,
    ) -> Result<Vec<StockMovement>, AppError> {
        let sql = format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE tenant_id = $1
              AND product_id = $2
              AND ($3::INTEGER IS NULL OR warehouse_id = $3)
            ORDER BY created_at ASC, id ASC
            "#
        );

        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(tenant_id)
            .bind(product_id)
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }
}
