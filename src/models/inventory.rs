// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// --- 1. Produtos ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub tenant_id: i32,
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub minimum_stock: i32,
    pub is_active: bool,
}

// --- 2. Depósitos ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub is_active: bool,
}

// --- 3. Movimentações de Estoque (livro-razão) ---

// O sinal da quantidade indica a direção:
// compra e entrada de transferência (+), venda e saída de transferência (-),
// ajuste com delta explícito.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "stock_movement_kind", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum MovementKind {
    Purchase,   // Vira "PURCHASE"
    Sale,       // Vira "SALE"
    Transfer,   // Vira "TRANSFER"
    Adjustment, // Vira "ADJUSTMENT"
}

// Fato imutável: nunca atualizado nem removido.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: i64,
    pub tenant_id: i32,
    pub product_id: i32,
    pub warehouse_id: i32,
    pub kind: MovementKind,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
    // Só em transferências: o depósito da outra ponta do par
    pub related_warehouse_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

// Movimento ainda não gravado. O tenant é carimbado pelo repositório.
#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub product_id: i32,
    pub warehouse_id: i32,
    pub kind: MovementKind,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
    pub related_warehouse_id: Option<i32>,
}

// O par criado por uma transferência
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPair {
    #[serde(rename = "out")]
    pub outbound: StockMovement,
    #[serde(rename = "in")]
    pub inbound: StockMovement,
}

// Saldo derivado (soma das movimentações)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_id: i32,
    pub warehouse_id: i32,
    pub quantity: i64,
}
