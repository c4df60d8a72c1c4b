// src/handlers/features.rs

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::tenancy::FeatureStatus,
};

// GET /api/features/{key}
// Módulo desconhecido, inativo ou desligado -> enabled: false
pub async fn get_feature(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(module_key): Path<String>,
) -> Result<Json<FeatureStatus>, AppError> {
    let enabled = app_state
        .feature_service
        .is_enabled(&tenant, &module_key)
        .await?;

    Ok(Json(FeatureStatus {
        module: module_key.trim().to_string(),
        enabled,
    }))
}
