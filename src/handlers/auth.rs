// src/handlers/auth.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AuthenticationResult, CurrentUser, LoginPayload},
};

// POST /api/auth/login
// Qualquer falha, inclusive corpo malformado -> 401 com { success: false, message }
pub async fn login(
    State(app_state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Json<AuthenticationResult>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(reason = %rejection, "Login rejeitado: corpo inválido");
        AppError::InvalidCredentials
    })?;

    let result = app_state
        .auth_service
        .login(
            payload.subdomain.as_deref().unwrap_or_default(),
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(result))
}

// GET /api/users/me
pub async fn get_me(AuthenticatedUser(claims): AuthenticatedUser) -> Json<CurrentUser> {
    Json(CurrentUser::from(&claims))
}
