use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{AuthProvider, ServerState, router};

async fn test_app() -> (Router, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    let state = ServerState {
        engine: Arc::new(engine),
        auth: Arc::new(AuthProvider::new(db.clone())),
    };
    (router(state), db)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn signup(app: &Router, email: &str) -> Value {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/signup",
            json!({
                "email": email,
                "password": "secret",
                "first_name": "Test",
                "last_name": "User",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn login(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": email, "password": "secret" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["access_token"].as_str().unwrap().to_string()
}

async fn promote_to_admin(db: &DatabaseConnection, email: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE users SET role = 'admin' WHERE email = ?",
        vec![email.into()],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn signup_and_login_issue_a_usable_token() {
    let (app, _db) = test_app().await;
    let body = signup(&app, "alice@example.com").await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["email"], json!("alice@example.com"));
    assert_eq!(body["data"]["balance"], json!("0.00"));

    let token = login(&app, "alice@example.com").await;
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/auth/me", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["data"]["email"], json!("alice@example.com"));
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bogus_tokens() {
    let (app, _db) = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/incomes", "not-a-token", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ledger_flow_reflects_in_the_dashboard() {
    let (app, _db) = test_app().await;
    signup(&app, "alice@example.com").await;
    let token = login(&app, "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/incomes",
            &token,
            Some(json!({ "amount": "1000.00", "source": "salary" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/expenses",
            &token,
            Some(json!({ "amount": "75.50", "category": "Food" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/dashboard/balance", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_income"], json!("1000.00"));
    assert_eq!(body["data"]["total_expense"], json!("75.50"));
    assert_eq!(body["data"]["balance"], json!("924.50"));
    assert_eq!(body["data"]["ledger_balance"], json!("924.50"));
}

#[tokio::test]
async fn overdrawing_expense_maps_to_400() {
    let (app, _db) = test_app().await;
    signup(&app, "alice@example.com").await;
    let token = login(&app, "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/expenses",
            &token,
            Some(json!({ "amount": "10.00", "category": "Food" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn malformed_amount_maps_to_422() {
    let (app, _db) = test_app().await;
    signup(&app, "alice@example.com").await;
    let token = login(&app, "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/incomes",
            &token,
            Some(json!({ "amount": "12.345", "source": "salary" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn foreign_entries_read_as_missing() {
    let (app, _db) = test_app().await;
    signup(&app, "alice@example.com").await;
    signup(&app, "bob@example.com").await;
    let alice = login(&app, "alice@example.com").await;
    let bob = login(&app, "bob@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/incomes",
            &alice,
            Some(json!({ "amount": "100.00", "source": "salary" })),
        ))
        .await
        .unwrap();
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed("GET", &format!("/api/v1/incomes/{id}"), &bob, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/api/v1/incomes/{id}"),
            &alice,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn duplicate_signup_maps_to_409() {
    let (app, _db) = test_app().await;
    signup(&app, "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/signup",
            json!({
                "email": "alice@example.com",
                "password": "other",
                "first_name": "Other",
                "last_name": "Person",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_routes_are_forbidden_for_plain_users() {
    let (app, db) = test_app().await;
    signup(&app, "alice@example.com").await;
    let token = login(&app, "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/admin/users", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Roles are re-read per request, so promotion applies to the live token.
    promote_to_admin(&db, "alice@example.com").await;
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/admin/users", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_summary_covers_other_users() {
    let (app, db) = test_app().await;
    signup(&app, "alice@example.com").await;
    let root_body = signup(&app, "root@example.com").await;
    let _root_id = root_body["data"]["id"].as_i64().unwrap();
    promote_to_admin(&db, "root@example.com").await;

    let alice = login(&app, "alice@example.com").await;
    let admin = login(&app, "root@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/incomes",
            &alice,
            Some(json!({ "amount": "50.00", "source": "salary" })),
        ))
        .await
        .unwrap();
    let created = body_json(response).await;
    let alice_id = created["data"]["user_id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            "GET",
            &format!("/api/v1/admin/summary?user_id={alice_id}"),
            &admin,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_income"], json!("50.00"));

    // Aggregate view has no single ledger balance.
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/admin/summary", &admin, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"].get("ledger_balance").is_none());
}

#[tokio::test]
async fn login_attempts_are_rate_limited() {
    let (app, _db) = test_app().await;

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/auth/login",
                json!({ "email": "ghost@example.com", "password": "nope" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": "ghost@example.com", "password": "nope" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn deactivated_users_lose_access() {
    let (app, db) = test_app().await;
    signup(&app, "alice@example.com").await;
    let token = login(&app, "alice@example.com").await;

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE users SET is_active = 0 WHERE email = ?",
        vec!["alice@example.com".into()],
    ))
    .await
    .unwrap();

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/auth/me", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
