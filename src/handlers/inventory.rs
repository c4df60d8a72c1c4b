// src/handlers/inventory.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::inventory::StockLevel,
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---

// Compra e venda têm o mesmo formato
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MovementPayload {
    pub product_id: i32,
    pub warehouse_id: i32,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)] // Se o JSON não tiver esse campo, assume 0
    pub unit_price: Decimal,

    #[validate(length(max = 1000, message = "As notas devem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentPayload {
    pub product_id: i32,
    pub warehouse_id: i32,

    // Zero é recusado pelo serviço (InvalidInput)
    pub quantity_delta: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub unit_price: Decimal,

    #[validate(length(max = 1000, message = "As notas devem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferPayload {
    pub product_id: i32,
    pub from_warehouse_id: i32,
    pub to_warehouse_id: i32,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub unit_price: Decimal,

    #[validate(length(max = 1000, message = "As notas devem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuery {
    pub product_id: i32,
    pub warehouse_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementsQuery {
    pub product_id: i32,
    pub warehouse_id: Option<i32>,
}

// ---
// Handlers
// ---

// GET /api/inventory/stock?productId=&warehouseId=
pub async fn get_stock(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<StockQuery>,
) -> Result<Json<StockLevel>, AppError> {
    let quantity = app_state
        .inventory_service
        .stock_on_hand(&tenant, query.product_id, query.warehouse_id)
        .await?;

    Ok(Json(StockLevel {
        product_id: query.product_id,
        warehouse_id: query.warehouse_id,
        quantity,
    }))
}

// GET /api/inventory/movements?productId=[&warehouseId=]
pub async fn list_movements(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<MovementsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state
        .inventory_service
        .movements(&tenant, query.product_id, query.warehouse_id)
        .await?;

    Ok((StatusCode::OK, Json(movements)))
}

// POST /api/inventory/purchases
pub async fn record_purchase(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<MovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = app_state
        .inventory_service
        .record_purchase(
            &tenant,
            payload.product_id,
            payload.warehouse_id,
            payload.quantity,
            payload.unit_price,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// POST /api/inventory/sales
pub async fn record_sale(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<MovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = app_state
        .inventory_service
        .record_sale(
            &tenant,
            payload.product_id,
            payload.warehouse_id,
            payload.quantity,
            payload.unit_price,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// POST /api/inventory/adjustments
pub async fn record_adjustment(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<AdjustmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = app_state
        .inventory_service
        .record_adjustment(
            &tenant,
            payload.product_id,
            payload.warehouse_id,
            payload.quantity_delta,
            payload.unit_price,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// POST /api/inventory/transfers
pub async fn record_transfer(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<TransferPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pair = app_state
        .inventory_service
        .record_transfer(
            &tenant,
            payload.product_id,
            payload.from_warehouse_id,
            payload.to_warehouse_id,
            payload.quantity,
            payload.unit_price,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(pair)))
}
