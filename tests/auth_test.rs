mod common;

use common::{app_state, seed_shop, PASSWORD};
use tenant_ledger::{
    common::error::AppError,
    db::MemoryStore,
    services::{auth::AuthService, password::PasswordHasher},
};

fn auth(store: &MemoryStore) -> AuthService {
    app_state(store).auth_service
}

fn assert_rejected(result: Result<impl std::fmt::Debug, AppError>) {
    match result {
        Err(AppError::InvalidCredentials) => {}
        other => panic!("esperava InvalidCredentials, veio {other:?}"),
    }
}

#[tokio::test]
async fn successful_login_returns_token_and_identity() {
    let store = MemoryStore::new();
    let shop = seed_shop(&store, "acme", "ana@acme.com").await;
    let state = app_state(&store);

    let result = state.auth_service.login("acme", "ana@acme.com", PASSWORD).await.unwrap();

    assert!(result.success);
    assert_eq!(result.tenant_id, Some(shop.tenant_id));
    assert_eq!(result.user_id, Some(shop.user_id));
    assert_eq!(result.email.as_deref(), Some("ana@acme.com"));
    assert_eq!(result.roles, Some(vec![]));
    assert!(result.message.is_none());

    let claims = state.token_issuer.validate(result.token.as_deref().unwrap()).unwrap();
    assert_eq!(claims.user_id(), Some(shop.user_id));
    assert_eq!(claims.tenant_id(), Some(shop.tenant_id));
    assert_eq!(claims.email, "ana@acme.com");
}

#[tokio::test]
async fn subdomain_and_email_match_ignoring_case_and_padding() {
    let store = MemoryStore::new();
    seed_shop(&store, "acme", "Ana@Acme.com").await;

    let result = auth(&store).login("  ACME ", "ana@ACME.COM ", PASSWORD).await.unwrap();
    assert!(result.success);
}

#[tokio::test]
async fn every_failure_looks_the_same() {
    let store = MemoryStore::new();
    seed_shop(&store, "acme", "ana@acme.com").await;
    let auth = auth(&store);

    assert_rejected(auth.login("", "ana@acme.com", PASSWORD).await);
    assert_rejected(auth.login("acme", "   ", PASSWORD).await);
    assert_rejected(auth.login("acme", "ana@acme.com", "  ").await);
    assert_rejected(auth.login("nope", "ana@acme.com", PASSWORD).await);
    assert_rejected(auth.login("acme", "bob@acme.com", PASSWORD).await);
    assert_rejected(auth.login("acme", "ana@acme.com", "wrong-password").await);

    let response = axum::response::IntoResponse::into_response(AppError::InvalidCredentials);
    assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn same_email_in_two_tenants_is_kept_apart() {
    let store = MemoryStore::new();
    let acme = seed_shop(&store, "acme", "shared@mail.com").await;
    let globex = seed_shop(&store, "globex", "shared@mail.com").await;

    // Senha diferente no segundo tenant
    let other_hash = PasswordHasher::new().hash("outra-senha").unwrap();
    let globex_user = store.add_user(globex.tenant_id, "only@globex.com", &other_hash).await;
    let auth = auth(&store);

    let a = auth.login("acme", "shared@mail.com", PASSWORD).await.unwrap();
    let g = auth.login("globex", "shared@mail.com", PASSWORD).await.unwrap();
    assert_eq!(a.tenant_id, Some(acme.tenant_id));
    assert_eq!(a.user_id, Some(acme.user_id));
    assert_eq!(g.tenant_id, Some(globex.tenant_id));
    assert_eq!(g.user_id, Some(globex.user_id));

    // Usuário de um tenant não entra pelo subdomínio do outro
    assert_rejected(auth.login("acme", "only@globex.com", "outra-senha").await);
    let ok = auth.login("globex", "only@globex.com", "outra-senha").await.unwrap();
    assert_eq!(ok.user_id, Some(globex_user));
}

#[tokio::test]
async fn inactive_tenant_or_user_cannot_log_in() {
    let store = MemoryStore::new();
    let acme = seed_shop(&store, "acme", "ana@acme.com").await;
    let globex = seed_shop(&store, "globex", "bob@globex.com").await;
    let auth = auth(&store);

    store.set_user_active(acme.user_id, false).await;
    assert_rejected(auth.login("acme", "ana@acme.com", PASSWORD).await);

    store.set_tenant_active(globex.tenant_id, false).await;
    assert_rejected(auth.login("globex", "bob@globex.com", PASSWORD).await);
}

#[tokio::test]
async fn ambiguous_subdomain_is_rejected() {
    let store = MemoryStore::new();
    seed_shop(&store, "acme", "ana@acme.com").await;
    seed_shop(&store, "ACME", "ana@acme.com").await;

    assert_rejected(auth(&store).login("acme", "ana@acme.com", PASSWORD).await);
}

#[tokio::test]
async fn malformed_stored_hash_fails_closed() {
    let store = MemoryStore::new();
    let tenant_id = store.add_tenant("Acme", "acme").await;
    store.add_user(tenant_id, "ana@acme.com", "PBKDF2$SHA256$not-a-number$xx$yy").await;

    assert_rejected(auth(&store).login("acme", "ana@acme.com", PASSWORD).await);
}

#[tokio::test]
async fn roles_are_distinct_and_scoped_to_the_tenant() {
    let store = MemoryStore::new();
    let acme = seed_shop(&store, "acme", "ana@acme.com").await;
    let globex = seed_shop(&store, "globex", "bob@globex.com").await;

    let admin = store.add_role(acme.tenant_id, "Admin").await;
    let seller = store.add_role(acme.tenant_id, "Seller").await;
    store.assign_role(acme.tenant_id, acme.user_id, seller).await;
    store.assign_role(acme.tenant_id, acme.user_id, admin).await;
    store.assign_role(acme.tenant_id, acme.user_id, admin).await;

    // Cargo de outro tenant não vaza
    let foreign = store.add_role(globex.tenant_id, "Owner").await;
    store.assign_role(globex.tenant_id, acme.user_id, foreign).await;

    let state = app_state(&store);
    let result = state.auth_service.login("acme", "ana@acme.com", PASSWORD).await.unwrap();
    assert_eq!(result.roles, Some(vec!["Admin".to_string(), "Seller".to_string()]));

    let claims = state.token_issuer.validate(result.token.as_deref().unwrap()).unwrap();
    assert_eq!(claims.role, vec!["Admin".to_string(), "Seller".to_string()]);
}

// O menor de alguns tempos de login, para reduzir ruído do agendador
async fn fastest_rejection(auth: &AuthService, subdomain: &str, email: &str, password: &str) -> std::time::Duration {
    let mut fastest = std::time::Duration::MAX;
    for _ in 0..3 {
        let started = std::time::Instant::now();
        assert_rejected(auth.login(subdomain, email, password).await);
        fastest = fastest.min(started.elapsed());
    }
    fastest
}

#[tokio::test]
async fn unknown_tenant_or_email_costs_a_full_key_derivation() {
    let store = MemoryStore::new();
    seed_shop(&store, "acme", "ana@acme.com").await;
    let auth = auth(&store);

    let wrong_password = fastest_rejection(&auth, "acme", "ana@acme.com", "wrong-password").await;
    let unknown_email = fastest_rejection(&auth, "acme", "nobody@acme.com", "wrong-password").await;
    let unknown_tenant = fastest_rejection(&auth, "globex", "ana@acme.com", "wrong-password").await;

    // Sem derivação, os dois últimos seriam ordens de grandeza mais rápidos
    assert!(unknown_email * 3 >= wrong_password, "{unknown_email:?} vs {wrong_password:?}");
    assert!(unknown_tenant * 3 >= wrong_password, "{unknown_tenant:?} vs {wrong_password:?}");
}
