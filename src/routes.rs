// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

use crate::{config::AppState, handlers, middleware::auth::tenant_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Rotas de usuário (token + tenant)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let inventory_routes = Router::new()
        .route("/stock", get(handlers::inventory::get_stock))
        .route("/movements", get(handlers::inventory::list_movements))
        .route("/purchases", post(handlers::inventory::record_purchase))
        .route("/sales", post(handlers::inventory::record_sale))
        .route("/adjustments", post(handlers::inventory::record_adjustment))
        .route("/transfers", post(handlers::inventory::record_transfer))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    let feature_routes = Router::new()
        .route("/{key}", get(handlers::features::get_feature))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/inventory", inventory_routes)
        .nest("/api/features", feature_routes)
        .with_state(app_state)
}
