// src/models/tenancy.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---
// 1. Tenant (A "Organização")
// ---
// Raiz do isolamento: toda entidade com tenant_id aponta para cá.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: i32,
    pub name: String,
    // Chave de login, comparada sem diferenciar maiúsculas
    pub subdomain: String,
    pub is_active: bool,
}

// ---
// 2. Module (Catálogo de funcionalidades opcionais)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: i32,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

// ---
// 3. TenantModule (A "Ponte" Tenant-Módulo)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TenantModule {
    pub id: i32,
    pub tenant_id: i32,
    pub module_id: i32,
    pub is_enabled: bool,
}

// Resposta de GET /api/features/{key}
#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureStatus {
    pub module: String,
    pub enabled: bool,
}
